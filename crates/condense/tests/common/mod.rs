#![allow(dead_code)]

use condense_compress::Compressor;
use condense_core::Config;
use condense_telemetry::Stats;
use std::sync::Arc;

pub const REVIEW_TRANSCRIPT: &str = "\
**LEAD:** Kicking off the review. @DEV please summarize the auth change.
DEV: Token refresh now happens before expiry. I vote for option A
**QA (tester):** +1 for option A
[OPS]: I support option B
DEV: I wasn't mentioned by anyone, just picked this up
QA: there are 3 votes for option A";

/// `n` numbered lines with `needle` on line `at` (1-based)
pub fn numbered_lines(n: usize, at: usize, needle: &str) -> String {
    (1..=n)
        .map(|i| {
            if i == at {
                format!("line {} {}", i, needle)
            } else {
                format!("line {}", i)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn isolated_compressor() -> (Compressor, Arc<Stats>) {
    let stats = Arc::new(Stats::new());
    let compressor = Compressor::new(Config::new()).with_stats(stats.clone());
    (compressor, stats)
}
