pub mod clear_cache;
pub mod compress;
pub mod estimate;
pub mod group;
pub mod stats;
pub mod version;

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

use condense_compress::{CacheStore, MemoryCache, SqliteCache};
use condense_core::{CompressError, Config};
use condense_group::AnalyzerConfig;
use condense_telemetry::{append_jsonl, Paths, UsageRecord};

/// Contents of `config.json` in the condense home. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    #[serde(flatten)]
    pub compress: Config,
    pub group: AnalyzerConfig,
}

/// Load settings, falling back to defaults when the file is missing or invalid
pub(crate) fn load_settings(paths: &Paths) -> Settings {
    let config_path = paths.config_file();
    if !config_path.exists() {
        return Settings::default();
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "failed to read config, using defaults");
            return Settings::default();
        }
    };

    match serde_json::from_str::<Settings>(&content) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "invalid config, using defaults");
            Settings::default()
        }
    }
}

/// SQLite cache in the condense home, or an in-memory one when it cannot
/// be opened
pub(crate) fn open_cache(paths: &Paths) -> Arc<dyn CacheStore> {
    match SqliteCache::open(&paths.cache_db()) {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!(error = %e, "persistent cache unavailable, using memory cache");
            Arc::new(MemoryCache::new())
        }
    }
}

/// Read a file lossily as UTF-8 after checking its size
pub(crate) fn read_input(path: &Path, config: &Config) -> Result<String, CompressError> {
    let size = std::fs::metadata(path)?.len();
    if size > config.max_file_bytes {
        return Err(CompressError::InputTooLarge {
            size,
            limit: config.max_file_bytes,
        });
    }
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Append to the usage history. A failed write only loses the record.
pub(crate) fn record_usage(paths: &Paths, record: &UsageRecord) {
    if let Err(e) = append_jsonl(&paths.history_file(), record) {
        warn!(error = %e, "failed to record usage");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let settings = load_settings(&Paths::at(temp.path()));
        assert_eq!(settings.compress, Config::new());
        assert_eq!(settings.group, AnalyzerConfig::new());
    }

    #[test]
    fn test_partial_config_overrides_fields() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.json"),
            r#"{"context_lines": 2, "group": {"summary_chars": 40, "severity": {"vote_count": "high"}}}"#,
        )
        .unwrap();

        let settings = load_settings(&Paths::at(temp.path()));
        assert_eq!(settings.compress.context_lines, 2);
        assert_eq!(settings.compress.chars_per_token, 4);
        assert_eq!(settings.group.summary_chars, 40);
        assert_eq!(
            settings.group.severity.vote_count,
            condense_group::Severity::High
        );
        assert_eq!(
            settings.group.severity.mention_denial,
            condense_group::Severity::High
        );
    }

    #[test]
    fn test_invalid_config_uses_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.json"), "{not json").unwrap();
        let settings = load_settings(&Paths::at(temp.path()));
        assert_eq!(settings.compress, Config::new());
    }

    #[test]
    fn test_read_input_checks_size() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("f.txt");
        std::fs::write(&path, "0123456789").unwrap();

        let small = Config {
            max_file_bytes: 4,
            ..Config::new()
        };
        assert!(matches!(
            read_input(&path, &small),
            Err(CompressError::InputTooLarge { size: 10, limit: 4 })
        ));
        assert_eq!(read_input(&path, &Config::new()).unwrap(), "0123456789");
    }

    #[test]
    fn test_open_cache_falls_back_to_memory() {
        let temp = tempfile::TempDir::new().unwrap();
        // A file where the home directory should be makes the db unopenable
        let blocker = temp.path().join("home");
        std::fs::write(&blocker, "").unwrap();
        let cache = open_cache(&Paths::at(&blocker));
        assert!(cache.is_empty().unwrap());
    }
}
