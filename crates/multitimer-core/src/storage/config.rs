//! TOML-based application configuration.
//!
//! Stores the default settings each mode starts from, plus alert
//! preferences. Configuration lives at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::settings::{CountdownSettings, IntervalSettings, PomodoroSettings, RepeatingSettings};
use crate::timer::{
    AnyTimer, Countdown, IntervalTimer, Pomodoro, RepeatingTimer, Stopwatch, TimerMode,
};

/// Completion alert configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

/// Application configuration.
///
/// Serialized to/from TOML. Missing sections and fields take their defaults;
/// out-of-range values are clamped on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub countdown: CountdownSettings,
    #[serde(default)]
    pub pomodoro: PomodoroSettings,
    #[serde(default)]
    pub interval: IntervalSettings,
    #[serde(default)]
    pub repeating: RepeatingSettings,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;
            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .trim()
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(_) => value
                    .trim()
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                serde_json::Value::Object(_) => return Err(unknown()),
                _ => serde_json::Value::String(value.into()),
            };
            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location: `<data_dir>/config.toml`.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults first when the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::path()?)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg.clamped())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "writing default config");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::path()?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Every leaf key in dotted form with its current value.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match Self::get_json_value_by_path(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, clamping it into range.
    /// The caller persists the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated.clamped();
        Ok(())
    }

    pub fn clamped(self) -> Self {
        Self {
            countdown: self.countdown.clamped(),
            pomodoro: self.pomodoro.clamped(),
            interval: self.interval.clamped(),
            repeating: self.repeating.clamped(),
            alerts: self.alerts,
        }
    }

    /// A fresh idle machine for `mode`, built from the configured defaults.
    pub fn machine(&self, mode: TimerMode) -> AnyTimer {
        match mode {
            TimerMode::Countdown => Countdown::new(self.countdown).into(),
            TimerMode::Pomodoro => Pomodoro::new(self.pomodoro).into(),
            TimerMode::Interval => IntervalTimer::new(self.interval).into(),
            TimerMode::Repeating => RepeatingTimer::new(self.repeating).into(),
            TimerMode::Stopwatch => Stopwatch::new().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerMachine;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.pomodoro.work_min, 25);
        assert!(parsed.alerts.enabled);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str("[interval]\nrounds = 3\n").unwrap();
        assert_eq!(parsed.interval.rounds, 3);
        assert_eq!(parsed.interval.interval_a_secs, 30);
        assert_eq!(parsed.countdown.duration_secs, 300);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("alerts.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("pomodoro.work_min").as_deref(), Some("25"));
        assert!(cfg.get("pomodoro").is_none());
        assert!(cfg.get("pomodoro.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_number_and_bool() {
        let mut cfg = Config::default();
        cfg.set("repeating.repeat_count", "7").unwrap();
        cfg.set("alerts.enabled", "false").unwrap();
        assert_eq!(cfg.repeating.repeat_count, 7);
        assert!(!cfg.alerts.enabled);
    }

    #[test]
    fn set_clamps_out_of_range_values() {
        let mut cfg = Config::default();
        cfg.set("pomodoro.work_min", "500").unwrap();
        assert_eq!(cfg.pomodoro.work_min, 120);
        cfg.set("countdown.duration_secs", "0").unwrap();
        assert_eq!(cfg.countdown.duration_secs, 1);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("pomodoro.nonexistent_key", "1").unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Config(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("alerts", "1").is_err());
        assert!(cfg.set("", "1").is_err());
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("alerts.enabled", "not_a_bool").is_err());
        assert!(cfg.set("interval.rounds", "-3").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn entries_lists_every_leaf() {
        let entries = Config::default().entries();
        assert!(entries.contains(&("alerts.enabled".to_string(), "true".to_string())));
        assert!(entries.contains(&("repeating.infinite".to_string(), "false".to_string())));
        assert_eq!(entries.len(), 12);
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg;
        changed.set("interval.interval_b_secs", "15").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().interval.interval_b_secs, 15);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "countdown = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn machine_uses_configured_defaults() {
        let mut cfg = Config::default();
        cfg.set("countdown.duration_secs", "90").unwrap();
        let timer = cfg.machine(TimerMode::Countdown);
        assert_eq!(timer.mode(), TimerMode::Countdown);
        assert_eq!(timer.snapshot().value, 90);
    }
}
