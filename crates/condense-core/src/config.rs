//! Limits and heuristic constants for compression

use serde::{Deserialize, Serialize};

/// Compressor configuration.
///
/// Size ceilings belong to the caller; the defaults match the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Max input text length in characters
    pub max_text_chars: usize,

    /// Max file size in bytes (checked before reading)
    pub max_file_bytes: u64,

    /// Max query length in characters
    pub max_query_chars: usize,

    /// Lines of context kept before and after each `relevant` match
    pub context_lines: usize,

    /// Prose paragraphs with fewer lines than this survive `summary`
    pub short_paragraph_lines: usize,

    /// Lines kept by code `summary` when no definition is found
    pub summary_fallback_lines: usize,

    /// Characters per token for estimates
    pub chars_per_token: usize,

    /// Characters of compressed text kept in a result preview
    pub preview_chars: usize,

    /// Input price in USD per million tokens, for `estimate`
    pub price_per_million_tokens: f64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            max_text_chars: 50 * 1024 * 1024,
            max_file_bytes: 100 * 1024 * 1024,
            max_query_chars: 10_000,
            context_lines: 5,
            short_paragraph_lines: 3,
            summary_fallback_lines: 20,
            chars_per_token: 4,
            preview_chars: 200,
            price_per_million_tokens: 3.0,
        }
    }

    /// Estimated token count for `text`
    pub fn estimate_tokens(&self, text: &str) -> usize {
        condense_telemetry::estimate_tokens_with(text, self.chars_per_token)
    }

    /// Estimated input cost in USD for `tokens`
    pub fn estimate_cost(&self, tokens: usize) -> f64 {
        tokens as f64 / 1_000_000.0 * self.price_per_million_tokens
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
