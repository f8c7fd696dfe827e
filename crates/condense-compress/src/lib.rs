//! Heuristic document compression with a fingerprint-keyed result cache

mod cache;
mod compressor;
mod fingerprint;
mod relevant;
mod selector;
mod storage;
mod strip;
mod summary;

pub use cache::{CacheEntry, CacheError, CacheStore, MemoryCache};
pub use compressor::{CompressRequest, Compressed, Compressor};
pub use fingerprint::{Fingerprint, SourceId};
pub use relevant::extract_relevant;
pub use selector::{select_method, sniff_category};
pub use storage::{SqliteCache, SCHEMA_VERSION};
pub use strip::strip;
pub use summary::{summarize, summarize_code, summarize_prose};
