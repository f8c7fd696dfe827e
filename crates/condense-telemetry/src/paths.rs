//! Path resolution for cache, history and config files

use std::path::{Path, PathBuf};

/// Environment variable overriding the condense home directory
pub const HOME_ENV: &str = "CONDENSE_HOME";

/// Resolves standard paths under the condense home directory
#[derive(Debug, Clone)]
pub struct Paths {
    pub home: PathBuf,
}

impl Paths {
    /// Resolve from `$CONDENSE_HOME`, falling back to `~/.condense`
    pub fn new() -> std::io::Result<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::at(PathBuf::from(dir)));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self::at(home.join(".condense")))
    }

    /// Use an explicit home directory
    pub fn at(home: impl AsRef<Path>) -> Self {
        Self {
            home: home.as_ref().to_path_buf(),
        }
    }

    /// Get the SQLite cache database path
    pub fn cache_db(&self) -> PathBuf {
        self.home.join("cache.db")
    }

    /// Get history.jsonl path
    pub fn history_file(&self) -> PathBuf {
        self.home.join("history.jsonl")
    }

    /// Get optional config.json path
    pub fn config_file(&self) -> PathBuf {
        self.home.join("config.json")
    }
}
