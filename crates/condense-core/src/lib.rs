//! Shared types, configuration and errors for condense

mod config;
mod error;
mod types;

pub use config::Config;
pub use error::CompressError;
pub use types::{preview, CommentStyle, CompressionResult, ContentCategory, Method};
