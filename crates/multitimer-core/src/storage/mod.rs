mod config;
pub mod database;

pub use config::{AlertsConfig, Config};
pub use database::{CompletionCount, Database};

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::Result;

/// Durable key/value storage for settings and machine state.
///
/// The engine never calls this itself; the owning layer loads before
/// building a machine and saves after every change.
pub trait SettingsStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store, for tests and environments without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::sync::Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| crate::CoreError::Custom(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| crate::CoreError::Custom(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load a JSON value stored under `key`, if present and well-formed.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: serde::de::DeserializeOwned,
    S: SettingsStore + ?Sized,
{
    match store.load(key)? {
        Some(json) => match serde_json::from_str(&json) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable stored value");
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: serde::Serialize,
    S: SettingsStore + ?Sized,
{
    store.save(key, &serde_json::to_string(value)?)
}

/// Returns the data directory.
///
/// `MULTITIMER_DATA_DIR` wins when set. Otherwise `~/.config/multitimer/`,
/// or `~/.config/multitimer-dev/` with `MULTITIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("MULTITIMER_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MULTITIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("multitimer-dev")
            } else {
                base_dir.join("multitimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load("countdown").unwrap().is_none());
        store.save("countdown", "300").unwrap();
        assert_eq!(store.load("countdown").unwrap().as_deref(), Some("300"));
    }

    #[test]
    fn malformed_json_loads_as_none() {
        let store = MemoryStore::new();
        store.save("timer.countdown", "{not json").unwrap();
        let loaded: Option<crate::timer::Countdown> = load_json(&store, "timer.countdown").unwrap();
        assert!(loaded.is_none());
    }
}
