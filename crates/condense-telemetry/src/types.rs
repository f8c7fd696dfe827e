//! Usage record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One compression call, persisted to the usage history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    /// File path or `group:<file>` label
    pub source: String,
    pub method: String,
    pub original_tokens: usize,
    pub compressed_tokens: usize,
    #[serde(default)]
    pub cache_hit: bool,
    /// Whether the call went through the cache at all
    #[serde(default)]
    pub cached: bool,
}

impl UsageRecord {
    pub fn new(source: &str, method: &str, original_tokens: usize, compressed_tokens: usize) -> Self {
        Self {
            timestamp: Utc::now(),
            source: source.to_string(),
            method: method.to_string(),
            original_tokens,
            compressed_tokens,
            cache_hit: false,
            cached: false,
        }
    }
}
