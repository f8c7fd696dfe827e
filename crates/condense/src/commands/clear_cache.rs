use std::sync::Arc;

use condense_compress::Compressor;
use condense_telemetry::{Paths, Stats};

use super::{load_settings, open_cache};

pub(crate) fn execute(paths: &Paths) {
    // Nothing to clear, and opening would create an empty db
    if !paths.cache_db().exists() {
        return;
    }
    Compressor::new(load_settings(paths).compress)
        .with_cache(open_cache(paths))
        .with_stats(Arc::new(Stats::new()))
        .clear_cache();
}

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    execute(&paths);
    println!("Cache cleared");
    Ok(())
}
