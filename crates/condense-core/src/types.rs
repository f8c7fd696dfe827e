//! Core types shared by the document and conversation compressors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CompressError;

/// Compression method requested by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Pick one of the other three from the query and content category
    Auto,
    /// Query-directed line extraction with a context window
    Relevant,
    /// Structural summary (definitions for code, short paragraphs for prose)
    Summary,
    /// Comment and blank-line stripping
    Strip,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::Auto, Method::Relevant, Method::Summary, Method::Strip];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Auto => "auto",
            Method::Relevant => "relevant",
            Method::Summary => "summary",
            Method::Strip => "strip",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = CompressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| CompressError::InvalidMethod(s.to_string()))
    }
}

/// Comment syntax stripped from code-like content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStyle {
    /// `#` line comments (Python, shell, TOML, YAML)
    Hash,
    /// `//` line comments and `/* */` blocks
    CStyle,
    /// No comment syntax
    Plain,
}

/// Coarse classification that drives method selection and summarization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "category", content = "comments")]
pub enum ContentCategory {
    Code(CommentStyle),
    Prose,
}

const HASH_EXTENSIONS: &[&str] = &["py", "sh", "bash", "rb", "pl", "toml", "yaml", "yml"];
const CSTYLE_EXTENSIONS: &[&str] = &[
    "rs", "js", "ts", "jsx", "tsx", "java", "c", "h", "cpp", "hpp", "cc", "go", "cs", "swift",
    "kt", "scala", "php",
];

impl ContentCategory {
    /// Classify by file extension (without the dot, case-insensitive)
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        if HASH_EXTENSIONS.contains(&ext.as_str()) {
            ContentCategory::Code(CommentStyle::Hash)
        } else if CSTYLE_EXTENSIONS.contains(&ext.as_str()) {
            ContentCategory::Code(CommentStyle::CStyle)
        } else {
            ContentCategory::Prose
        }
    }

    pub fn is_code(&self) -> bool {
        matches!(self, ContentCategory::Code(_))
    }

    pub fn comment_style(&self) -> CommentStyle {
        match self {
            ContentCategory::Code(style) => *style,
            ContentCategory::Prose => CommentStyle::Plain,
        }
    }
}

/// Outcome of a single compression call. Built once, read through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionResult {
    original_size: usize,
    compressed_size: usize,
    method: Method,
    compression_ratio: f64,
    estimated_token_savings: i64,
    preview: Option<String>,
}

impl CompressionResult {
    /// Measure `original` against `compressed`; sizes are character counts
    pub fn measure(
        original: &str,
        compressed: &str,
        method: Method,
        chars_per_token: usize,
        preview_chars: usize,
    ) -> Self {
        let original_size = original.chars().count();
        let compressed_size = compressed.chars().count();
        Self::from_parts(
            original_size,
            compressed_size,
            method,
            chars_per_token,
            preview(compressed, preview_chars),
        )
    }

    /// Rebuild from stored parts (cache rows), deriving ratio and savings
    pub fn from_parts(
        original_size: usize,
        compressed_size: usize,
        method: Method,
        chars_per_token: usize,
        preview: Option<String>,
    ) -> Self {
        let compression_ratio = if original_size == 0 {
            0.0
        } else {
            compressed_size as f64 / original_size as f64
        };
        let saved = original_size as i64 - compressed_size as i64;
        Self {
            original_size,
            compressed_size,
            method,
            compression_ratio,
            estimated_token_savings: saved / chars_per_token.max(1) as i64,
            preview,
        }
    }

    /// Rebuild a persisted result verbatim
    pub fn restore(
        original_size: usize,
        compressed_size: usize,
        method: Method,
        compression_ratio: f64,
        estimated_token_savings: i64,
        preview: Option<String>,
    ) -> Self {
        Self {
            original_size,
            compressed_size,
            method,
            compression_ratio,
            estimated_token_savings,
            preview,
        }
    }

    pub fn original_size(&self) -> usize {
        self.original_size
    }

    pub fn compressed_size(&self) -> usize {
        self.compressed_size
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn compression_ratio(&self) -> f64 {
        self.compression_ratio
    }

    pub fn estimated_token_savings(&self) -> i64 {
        self.estimated_token_savings
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut
pub fn preview(text: &str, max_chars: usize) -> Option<String> {
    if text.is_empty() || max_chars == 0 {
        return None;
    }
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => Some(format!("{}...", &text[..cut])),
        None => Some(text.to_string()),
    }
}
