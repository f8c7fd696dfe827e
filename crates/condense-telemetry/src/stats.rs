//! Process-wide compression counters

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::UsageRecord;

static GLOBAL: OnceLock<Arc<Stats>> = OnceLock::new();

/// Running counters updated by every compression call.
///
/// Counters are independent atomics: a snapshot taken during concurrent
/// updates may be slightly stale, never torn.
#[derive(Debug, Default)]
pub struct Stats {
    compressions: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    total_original_tokens: AtomicU64,
    total_compressed_tokens: AtomicU64,
}

/// Point-in-time view of [`Stats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub compressions: u64,
    pub total_original_tokens: u64,
    pub total_compressed_tokens: u64,
    pub overall_compression_percent: f64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide instance, zeroed on first use
    pub fn global() -> Arc<Stats> {
        GLOBAL.get_or_init(|| Arc::new(Stats::new())).clone()
    }

    /// Rebuild counters from persisted usage records
    pub fn from_records(records: &[UsageRecord]) -> Self {
        let stats = Stats::new();
        for record in records {
            if record.cache_hit {
                stats.record_cache_hit();
            } else {
                if record.cached {
                    stats.record_cache_miss();
                }
                stats.record_compression(record.original_tokens, record.compressed_tokens);
            }
        }
        stats
    }

    pub fn record_compression(&self, original_tokens: usize, compressed_tokens: usize) {
        self.compressions.fetch_add(1, Ordering::Relaxed);
        self.total_original_tokens
            .fetch_add(original_tokens as u64, Ordering::Relaxed);
        self.total_compressed_tokens
            .fetch_add(compressed_tokens as u64, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        for counter in [
            &self.compressions,
            &self.cache_hits,
            &self.cache_misses,
            &self.total_original_tokens,
            &self.total_compressed_tokens,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let compressions = self.compressions.load(Ordering::Relaxed);
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.cache_misses.load(Ordering::Relaxed);
        let original = self.total_original_tokens.load(Ordering::Relaxed);
        let compressed = self.total_compressed_tokens.load(Ordering::Relaxed);

        let overall_compression_percent = if original > 0 {
            (original as f64 - compressed as f64) / original as f64 * 100.0
        } else {
            0.0
        };
        let lookups = cache_hits + cache_misses;
        let cache_hit_rate = if lookups > 0 {
            cache_hits as f64 / lookups as f64 * 100.0
        } else {
            0.0
        };

        StatsSnapshot {
            compressions,
            total_original_tokens: original,
            total_compressed_tokens: compressed,
            overall_compression_percent,
            cache_hits,
            cache_misses,
            cache_hit_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_fresh_stats_are_zero() {
        let snapshot = Stats::new().snapshot();
        assert_eq!(snapshot.compressions, 0);
        assert_eq!(snapshot.overall_compression_percent, 0.0);
        assert_eq!(snapshot.cache_hit_rate, 0.0);
    }

    #[test]
    fn test_overall_percent() {
        let stats = Stats::new();
        stats.record_compression(100, 25);
        stats.record_compression(100, 75);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.compressions, 2);
        assert_eq!(snapshot.total_original_tokens, 200);
        assert_eq!(snapshot.total_compressed_tokens, 100);
        assert!((snapshot.overall_compression_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_rate_over_lookups() {
        let stats = Stats::new();
        stats.record_cache_miss();
        stats.record_cache_hit();
        stats.record_cache_hit();
        stats.record_cache_hit();
        assert!((stats.snapshot().cache_hit_rate - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let stats = Stats::new();
        stats.record_compression(10, 5);
        stats.record_cache_hit();
        stats.reset();
        assert_eq!(stats.snapshot(), Stats::new().snapshot());
    }

    #[test]
    fn test_concurrent_updates_are_counted() {
        let stats = Arc::new(Stats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        stats.record_compression(4, 2);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.snapshot().compressions, 1000);
        assert_eq!(stats.snapshot().total_original_tokens, 4000);
    }

    #[test]
    fn test_from_records() {
        let mut miss = UsageRecord::new("a.rs", "strip", 100, 40);
        miss.cached = true;
        let mut hit = miss.clone();
        hit.cache_hit = true;
        let group = UsageRecord::new("group:log.md", "group", 80, 20);

        let snapshot = Stats::from_records(&[miss, hit, group]).snapshot();
        assert_eq!(snapshot.compressions, 2);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.total_original_tokens, 180);
        assert!((snapshot.cache_hit_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    #[serial]
    fn test_global_is_shared() {
        let a = Stats::global();
        let b = Stats::global();
        a.reset();
        a.record_cache_hit();
        assert_eq!(b.snapshot().cache_hits, 1);
        a.reset();
    }
}
