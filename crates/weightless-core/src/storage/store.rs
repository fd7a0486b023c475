//! Persistence of the current session configuration.
//!
//! The record is an opaque JSON blob under one namespaced key. Loading merges
//! the stored fields over the defaults, so blobs written by older versions
//! still load.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use super::Database;
use crate::error::Result;
use crate::timer::SessionConfig;

/// Key of the persisted configuration blob.
pub const CONFIG_KEY: &str = "wl.currentConfig.v1";

pub trait ConfigStore {
    /// Defaults merged with any stored overrides. An unreadable record
    /// yields the defaults.
    fn load(&self) -> Result<SessionConfig>;

    /// Stamp `updated_at`, persist, and return the stamped record.
    fn save(&mut self, config: &SessionConfig) -> Result<SessionConfig>;

    /// Forget the stored record.
    fn clear(&mut self) -> Result<()>;
}

/// Merge the stored fields over the defaults one at a time. A field that
/// does not fit its type is dropped and its default kept.
fn decode(blob: Option<&str>) -> SessionConfig {
    let Some(json) = blob else {
        return SessionConfig::default();
    };
    let stored = match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!("stored session config is not an object, using defaults");
            return SessionConfig::default();
        }
        Err(e) => {
            warn!(error = %e, "stored session config unreadable, using defaults");
            return SessionConfig::default();
        }
    };

    let Ok(mut merged) = serde_json::to_value(SessionConfig::default()) else {
        return SessionConfig::default();
    };
    for (key, value) in stored {
        let mut candidate = merged.clone();
        candidate[key.as_str()] = value;
        match serde_json::from_value::<SessionConfig>(candidate.clone()) {
            Ok(_) => merged = candidate,
            Err(e) => warn!(field = %key, error = %e, "dropping unreadable stored field"),
        }
    }
    serde_json::from_value(merged).unwrap_or_default()
}

fn stamp(config: &SessionConfig) -> SessionConfig {
    SessionConfig {
        updated_at: Some(Utc::now()),
        ..config.clone()
    }
}

/// Store backed by the SQLite `kv` table.
pub struct KvConfigStore {
    db: Database,
}

impl KvConfigStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the default database location.
    pub fn open() -> Result<Self> {
        Ok(Self::new(Database::open()?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl ConfigStore for KvConfigStore {
    fn load(&self) -> Result<SessionConfig> {
        let blob = self.db.kv_get(CONFIG_KEY)?;
        Ok(decode(blob.as_deref()))
    }

    fn save(&mut self, config: &SessionConfig) -> Result<SessionConfig> {
        let stamped = stamp(config);
        self.db.kv_set(CONFIG_KEY, &serde_json::to_string(&stamped)?)?;
        debug!(key = CONFIG_KEY, "session config saved");
        Ok(stamped)
    }

    fn clear(&mut self) -> Result<()> {
        self.db.kv_delete(CONFIG_KEY)?;
        Ok(())
    }
}

/// In-memory store holding the serialized blob, for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryConfigStore {
    blob: Option<String>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a raw blob, as if written by another version.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<SessionConfig> {
        Ok(decode(self.blob.as_deref()))
    }

    fn save(&mut self, config: &SessionConfig) -> Result<SessionConfig> {
        let stamped = stamp(config);
        self.blob = Some(serde_json::to_string(&stamped)?);
        Ok(stamped)
    }

    fn clear(&mut self) -> Result<()> {
        self.blob = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_loads_defaults() {
        let store = KvConfigStore::new(Database::open_memory().unwrap());
        assert_eq!(store.load().unwrap(), SessionConfig::default());
    }

    #[test]
    fn save_stamps_and_persists() {
        let mut store = KvConfigStore::new(Database::open_memory().unwrap());
        let saved = store.save(&SessionConfig::new(90, 45, 5, 4)).unwrap();
        assert!(saved.updated_at.is_some());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, saved);
        let raw = store.database().kv_get(CONFIG_KEY).unwrap().unwrap();
        assert!(raw.contains("\"breatheSec\":90"));
        assert!(raw.contains("\"updatedAt\""));
    }

    #[test]
    fn partial_blob_is_merged_over_defaults() {
        let store = MemoryConfigStore::with_blob(r#"{"rounds":3,"holdSec":75}"#);
        let loaded = store.load().unwrap();
        assert_eq!(loaded.rounds, 3);
        assert_eq!(loaded.hold_sec, 75);
        assert_eq!(loaded.breathe_sec, 120);
        assert_eq!(loaded.decrease_sec, 10);
    }

    #[test]
    fn bad_field_keeps_the_readable_ones() {
        let store = MemoryConfigStore::with_blob(
            r#"{"breatheSec":90,"updatedAt":"yesterday","rounds":"six"}"#,
        );
        let loaded = store.load().unwrap();
        assert_eq!(loaded.breathe_sec, 90);
        assert_eq!(loaded.rounds, 6);
        assert!(loaded.updated_at.is_none());
    }

    #[test]
    fn corrupt_blob_falls_back_to_defaults() {
        let store = MemoryConfigStore::with_blob("{not json");
        assert_eq!(store.load().unwrap(), SessionConfig::default());
        let store = MemoryConfigStore::with_blob("[1, 2]");
        assert_eq!(store.load().unwrap(), SessionConfig::default());
    }

    #[test]
    fn clear_forgets_record() {
        let mut store = MemoryConfigStore::new();
        store.save(&SessionConfig::new(60, 30, 0, 2)).unwrap();
        assert!(store.blob().is_some());
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), SessionConfig::default());
    }
}
