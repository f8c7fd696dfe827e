//! Token estimation, usage statistics and file helpers for condense

mod io;
mod paths;
mod stats;
mod tokens;
mod types;

pub use io::{append_jsonl, atomic_write, read_jsonl};
pub use paths::{Paths, HOME_ENV};
pub use stats::{Stats, StatsSnapshot};
pub use tokens::{estimate_tokens, estimate_tokens_with, CHARS_PER_TOKEN};
pub use types::UsageRecord;
