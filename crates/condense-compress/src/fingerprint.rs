//! Cache keys derived from source identity, query and method

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

use condense_core::Method;

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Canonical identity of the content being compressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceId(String);

impl SourceId {
    /// In-memory text, identified by its content digest
    pub fn text(content: &str) -> Self {
        Self(format!("text:{}", sha256_hex(content.as_bytes())))
    }

    /// A file, identified by canonical path plus content digest so edits miss
    pub fn file(canonical_path: &Path, content: &str) -> Self {
        Self(format!(
            "file:{}:{}",
            canonical_path.display(),
            sha256_hex(content.as_bytes())
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Hex SHA-256 of `source|query|method`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// `method` is the requested method, so `auto` and `strip` key separately
    pub fn new(source: &SourceId, query: Option<&str>, method: Method) -> Self {
        let key = format!("{}|{}|{}", source.as_str(), query.unwrap_or(""), method);
        Self(sha256_hex(key.as_bytes()))
    }

    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
