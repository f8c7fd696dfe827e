use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use condense_core::{CompressError, CompressionResult, Config, ContentCategory, Method};
use condense_telemetry::{Stats, StatsSnapshot};

use crate::cache::{CacheEntry, CacheStore, MemoryCache};
use crate::fingerprint::{Fingerprint, SourceId};
use crate::relevant::extract_relevant;
use crate::selector::{select_method, sniff_category};
use crate::strip::strip;
use crate::summary::summarize;

/// Everything that identifies one compression call
#[derive(Debug, Clone)]
pub struct CompressRequest<'a> {
    pub text: &'a str,
    pub query: Option<&'a str>,
    pub method: Method,
    pub category: ContentCategory,
    pub source: SourceId,
}

impl<'a> CompressRequest<'a> {
    /// Request for in-memory text, category sniffed from the content
    pub fn text(text: &'a str, query: Option<&'a str>, method: Method) -> Self {
        Self {
            text,
            query,
            method,
            category: sniff_category(text),
            source: SourceId::text(text),
        }
    }

    pub fn with_category(mut self, category: ContentCategory) -> Self {
        self.category = category;
        self
    }
}

/// Compressed text plus its result record
#[derive(Debug, Clone)]
pub struct Compressed {
    pub text: String,
    pub result: CompressionResult,
    pub cache_hit: bool,
}

impl Compressed {
    pub fn into_parts(self) -> (String, CompressionResult) {
        (self.text, self.result)
    }
}

/// Single-document compressor with result caching
pub struct Compressor {
    config: Config,
    cache: Arc<dyn CacheStore>,
    stats: Arc<Stats>,
}

impl Compressor {
    /// In-memory cache, process-wide stats
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cache: Arc::new(MemoryCache::new()),
            stats: Stats::global(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_stats(mut self, stats: Arc<Stats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats_handle(&self) -> Arc<Stats> {
        self.stats.clone()
    }

    fn validate(&self, request: &CompressRequest<'_>) -> Result<(), CompressError> {
        if let Some(query) = request.query {
            let len = query.chars().count();
            if len > self.config.max_query_chars {
                return Err(CompressError::QueryTooLong {
                    len,
                    limit: self.config.max_query_chars,
                });
            }
        }

        let size = request.text.chars().count();
        if size > self.config.max_text_chars {
            return Err(CompressError::InputTooLarge {
                size: size as u64,
                limit: self.config.max_text_chars as u64,
            });
        }

        let has_query = request.query.is_some_and(|q| !q.is_empty());
        if request.method == Method::Relevant && !has_query {
            return Err(CompressError::MissingQuery);
        }
        Ok(())
    }

    /// Run a method, resolving `auto` first; returns the text and the method
    /// actually used
    fn run(&self, method: Method, request: &CompressRequest<'_>) -> (String, Method) {
        let text = request.text;
        match method {
            Method::Relevant => {
                let query = request.query.unwrap_or_default();
                match extract_relevant(text, query, self.config.context_lines) {
                    Some(out) => (out, Method::Relevant),
                    None => {
                        debug!(query, "no lines match query, summarizing instead");
                        (
                            summarize(text, request.category, &self.config),
                            Method::Summary,
                        )
                    }
                }
            }
            Method::Summary => (
                summarize(text, request.category, &self.config),
                Method::Summary,
            ),
            Method::Strip => (
                strip(text, request.category.comment_style()),
                Method::Strip,
            ),
            Method::Auto => self.run(
                select_method(method, request.query, request.category),
                request,
            ),
        }
    }

    /// Compress one request, consulting the cache first.
    ///
    /// A hit returns the stored result without running any heuristic and only
    /// counts as a cache hit. Cache failures are logged and ignored.
    pub fn compress(&self, request: &CompressRequest<'_>) -> Result<Compressed, CompressError> {
        self.validate(request)?;

        let key = Fingerprint::new(&request.source, request.query, request.method);
        match self.cache.get(&key) {
            Ok(Some(entry)) => {
                debug!(key = %key, "cache hit");
                self.stats.record_cache_hit();
                return Ok(Compressed {
                    text: entry.compressed_text,
                    result: entry.result,
                    cache_hit: true,
                });
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "cache lookup failed, recomputing"),
        }

        let method = select_method(request.method, request.query, request.category);
        let (text, method) = self.run(method, request);
        debug!(requested = %request.method, used = %method, "compressed");

        let result = CompressionResult::measure(
            request.text,
            &text,
            method,
            self.config.chars_per_token,
            self.config.preview_chars,
        );

        let entry = CacheEntry::new(key, result.clone(), text.clone());
        if let Err(e) = self.cache.put(&entry) {
            warn!(error = %e, "cache write failed, result not persisted");
        }

        self.stats.record_cache_miss();
        self.stats.record_compression(
            self.config.estimate_tokens(request.text),
            self.config.estimate_tokens(&text),
        );

        Ok(Compressed {
            text,
            result,
            cache_hit: false,
        })
    }

    /// Compress arbitrary text
    pub fn compress_text(
        &self,
        text: &str,
        query: Option<&str>,
        method: Method,
    ) -> Result<(String, CompressionResult), CompressError> {
        self.compress(&CompressRequest::text(text, query, method))
            .map(Compressed::into_parts)
    }

    /// Compress a file; the category comes from its extension when known
    pub fn compress_file(
        &self,
        path: &Path,
        query: Option<&str>,
        method: Method,
    ) -> Result<Compressed, CompressError> {
        let path = path.canonicalize()?;
        let size = std::fs::metadata(&path)?.len();
        if size > self.config.max_file_bytes {
            return Err(CompressError::InputTooLarge {
                size,
                limit: self.config.max_file_bytes,
            });
        }

        let bytes = std::fs::read(&path)?;
        let content = String::from_utf8_lossy(&bytes);
        let category = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ContentCategory::from_extension(ext),
            None => sniff_category(&content),
        };

        self.compress(&CompressRequest {
            text: &content,
            query,
            method,
            category,
            source: SourceId::file(&path, &content),
        })
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Drop every cache entry. Failures are logged, never raised.
    pub fn clear_cache(&self) {
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "failed to clear cache");
        }
    }
}
