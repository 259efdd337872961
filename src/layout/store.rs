//! Preference storage backends
//!
//! The overlay only needs a flat key/value store of small typed values.
//! [`MemoryStore`] backs tests and one-shot CLI runs; [`SledStore`] persists
//! to an embedded sled database.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// A single stored preference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefValue {
    Float(f32),
    Bool(bool),
    Int(i32),
}

impl PrefValue {
    pub fn as_f32(self) -> Option<f32> {
        match self {
            PrefValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            PrefValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i32(self) -> Option<i32> {
        match self {
            PrefValue::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrefValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefValue::Float(v) => write!(f, "{:.1}", v),
            PrefValue::Bool(v) => write!(f, "{}", v),
            PrefValue::Int(v) => write!(f, "{}", v),
        }
    }
}

/// Store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("failed to encode preference: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("preference store lock poisoned")]
    Poisoned,
}

/// Key/value preference storage
///
/// Reads never fail from the caller's point of view: missing, unreadable
/// or wrongly typed values fall back to the supplied default.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<PrefValue>;

    /// Buffer a write; durable after [`commit`](Self::commit)
    fn put(&self, key: &str, value: PrefValue) -> Result<(), StoreError>;

    /// Block until buffered writes are durable
    fn commit(&self) -> Result<(), StoreError>;

    /// All stored keys, sorted
    fn keys(&self) -> Vec<String>;

    fn get_f32(&self, key: &str, default: f32) -> f32 {
        self.get(key).and_then(PrefValue::as_f32).unwrap_or(default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(PrefValue::as_bool).unwrap_or(default)
    }

    fn get_i32(&self, key: &str, default: i32) -> i32 {
        self.get(key).and_then(PrefValue::as_i32).unwrap_or(default)
    }
}

/// In-memory store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, PrefValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        self.values.read().ok()?.get(key).copied()
    }

    fn put(&self, key: &str, value: PrefValue) -> Result<(), StoreError> {
        let mut values = self.values.write().map_err(|_| StoreError::Poisoned)?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn commit(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .values
            .read()
            .map(|v| v.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

/// sled-backed store; values are JSON-encoded [`PrefValue`]s
///
/// Inserts land in sled's page cache and are flushed by its background
/// flusher; [`commit`](PreferenceStore::commit) forces a synchronous flush.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) the database at `path`
    ///
    /// `flush_every_ms` sets sled's background flush interval; `None` keeps
    /// sled's default.
    pub fn open(path: impl AsRef<Path>, flush_every_ms: Option<u64>) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::Config::new()
            .path(path)
            .flush_every_ms(flush_every_ms)
            .open()
            .with_context(|| format!("Failed to open sled database at: {}", path.display()))?;
        debug!("Preference store opened at {}", path.display());
        Ok(Self { db })
    }

    /// Temporary database that is removed on drop
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .context("Failed to open temporary sled database")?;
        Ok(Self { db })
    }
}

impl PreferenceStore for SledStore {
    fn get(&self, key: &str) -> Option<PrefValue> {
        let bytes = match self.db.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read preference {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring malformed preference {}: {}", key, e);
                None
            }
        }
    }

    fn put(&self, key: &str, value: PrefValue) -> Result<(), StoreError> {
        let json = serde_json::to_vec(&value)?;
        self.db.insert(key, json)?;
        trace!("Preference {} = {}", key, value);
        Ok(())
    }

    fn commit(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.db
            .iter()
            .keys()
            .filter_map(|key| match key {
                Ok(key) => String::from_utf8(key.to_vec()).ok(),
                Err(e) => {
                    warn!("Failed to iterate preference keys: {}", e);
                    None
                }
            })
            .collect()
    }
}
