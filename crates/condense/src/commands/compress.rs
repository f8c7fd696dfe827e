use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use condense_compress::{Compressed, Compressor};
use condense_core::{CompressionResult, Method};
use condense_telemetry::{Paths, Stats, UsageRecord};

use super::{load_settings, open_cache, record_usage};

#[derive(Serialize)]
struct JsonOutput<'a> {
    compressed_text: &'a str,
    cache_hit: bool,
    #[serde(flatten)]
    result: &'a CompressionResult,
}

fn usage_record(file: &Path, compressed: &Compressed, chars_per_token: usize) -> UsageRecord {
    let per_token = chars_per_token.max(1);
    let result = &compressed.result;
    let mut record = UsageRecord::new(
        &file.display().to_string(),
        result.method().as_str(),
        result.original_size() / per_token,
        result.compressed_size() / per_token,
    );
    record.cached = true;
    record.cache_hit = compressed.cache_hit;
    record
}

/// Compress `file` with the persistent cache under `paths` and append a
/// usage record
pub(crate) fn execute(
    paths: &Paths,
    file: &Path,
    query: Option<&str>,
    method: &str,
) -> anyhow::Result<Compressed> {
    let method: Method = method.parse()?;
    let settings = load_settings(paths);
    let chars_per_token = settings.compress.chars_per_token;

    let compressor = Compressor::new(settings.compress)
        .with_cache(open_cache(paths))
        .with_stats(Arc::new(Stats::new()));
    let compressed = compressor.compress_file(file, query, method)?;

    record_usage(paths, &usage_record(file, &compressed, chars_per_token));
    Ok(compressed)
}

pub fn run(file: &Path, query: Option<&str>, method: &str, json: bool) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let compressed = execute(&paths, file, query, method)?;

    if json {
        let output = JsonOutput {
            compressed_text: &compressed.text,
            cache_hit: compressed.cache_hit,
            result: &compressed.result,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", compressed.text);
    let result = &compressed.result;
    eprintln!(
        "{}: {} -> {} chars ({:.1}%), ~{} tokens saved{}",
        result.method(),
        result.original_size(),
        result.compressed_size(),
        result.compression_ratio() * 100.0,
        result.estimated_token_savings(),
        if compressed.cache_hit { " [cached]" } else { "" }
    );
    Ok(())
}
