//! Cache store abstraction and the in-memory backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

use condense_core::CompressionResult;

use crate::Fingerprint;

/// Cache failures. Never surfaced to compression callers.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed cache row: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("cache incompatible (schema {found}, expected {expected}), recompute")]
    Incompatible { found: i64, expected: i64 },

    #[error("cache lock poisoned")]
    Poisoned,
}

/// A stored compression: result plus the compressed text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: Fingerprint,
    pub result: CompressionResult,
    pub compressed_text: String,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: Fingerprint, result: CompressionResult, compressed_text: String) -> Self {
        Self {
            key,
            result,
            compressed_text,
            created_at: Utc::now(),
        }
    }
}

/// Keyed store of compression results.
///
/// Each `get`/`put` is atomic per key; concurrent writers to one key race
/// benignly and the last write wins.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &Fingerprint) -> Result<Option<CacheEntry>, CacheError>;

    fn put(&self, entry: &CacheEntry) -> Result<(), CacheError>;

    /// Remove every entry
    fn clear(&self) -> Result<(), CacheError>;

    fn len(&self) -> Result<usize, CacheError>;

    fn is_empty(&self) -> Result<bool, CacheError> {
        Ok(self.len()? == 0)
    }
}

/// Process-local cache backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<Fingerprint, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &Fingerprint) -> Result<Option<CacheEntry>, CacheError> {
        let entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        entries.insert(entry.key.clone(), entry.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Poisoned)?
            .clear();
        Ok(())
    }

    fn len(&self) -> Result<usize, CacheError> {
        Ok(self.entries.lock().map_err(|_| CacheError::Poisoned)?.len())
    }
}
