//! SQLite-backed storage.
//!
//! Provides:
//! - Key-value store for persisted settings and machine state
//! - A log of completion events with per-mode counts

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{data_dir, SettingsStore};
use crate::error::{DatabaseError, Result};
use crate::events::Event;
use crate::timer::TimerMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCount {
    pub mode: String,
    pub kind: String,
    pub count: u64,
    pub last_at: DateTime<Utc>,
}

/// SQLite database at `<data_dir>/multitimer.db`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database in the data directory.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("multitimer.db"))
    }

    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS completions (
                id     INTEGER PRIMARY KEY AUTOINCREMENT,
                mode   TEXT NOT NULL,
                kind   TEXT NOT NULL,
                detail TEXT NOT NULL DEFAULT '{}',
                at     TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_completions_mode ON completions(mode);",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Append a completion event to the log. Other events are ignored.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_completion(&self, mode: TimerMode, event: &Event) -> Result<bool> {
        if !event.is_completion() {
            return Ok(false);
        }
        let detail = serde_json::to_string(event)?;
        self.conn.execute(
            "INSERT INTO completions (mode, kind, detail, at) VALUES (?1, ?2, ?3, ?4)",
            params![mode.as_str(), event.kind(), detail, event.at().to_rfc3339()],
        )?;
        tracing::debug!(mode = mode.as_str(), kind = event.kind(), "completion recorded");
        Ok(true)
    }

    /// Completion counts grouped by mode and event kind.
    pub fn completion_counts(&self) -> Result<Vec<CompletionCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT mode, kind, COUNT(*), MAX(at)
             FROM completions
             GROUP BY mode, kind
             ORDER BY mode, kind",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            let (mode, kind, count, last_at) = row?;
            let last_at = DateTime::parse_from_rfc3339(&last_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_default();
            counts.push(CompletionCount {
                mode,
                kind,
                count,
                last_at,
            });
        }
        Ok(counts)
    }
}

impl SettingsStore for Database {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.kv_get(key)?)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        Ok(self.kv_set(key, value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::timestamp;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.load("test").unwrap().as_deref(), Some("again"));
    }

    #[test]
    fn only_completions_are_recorded() {
        let db = Database::open_memory().unwrap();
        let at = timestamp(1_700_000_000_000);
        let done = Event::Completed {
            mode: TimerMode::Countdown,
            completed_count: None,
            at,
        };
        let reset = Event::TimerReset {
            mode: TimerMode::Countdown,
            at,
        };
        assert!(db.record_completion(TimerMode::Countdown, &done).unwrap());
        assert!(!db.record_completion(TimerMode::Countdown, &reset).unwrap());
        assert!(db.record_completion(TimerMode::Countdown, &done).unwrap());

        let counts = db.completion_counts().unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].mode, "countdown");
        assert_eq!(counts[0].kind, "completed");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[0].last_at, at);
    }
}
