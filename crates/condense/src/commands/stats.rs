use condense_telemetry::{atomic_write, read_jsonl, Paths, Stats, StatsSnapshot, UsageRecord};

/// Counters replayed from the usage history
pub(crate) fn load(paths: &Paths) -> anyhow::Result<StatsSnapshot> {
    let records: Vec<UsageRecord> = read_jsonl(&paths.history_file())?;
    Ok(Stats::from_records(&records).snapshot())
}

pub(crate) fn reset(paths: &Paths) -> anyhow::Result<()> {
    let history = paths.history_file();
    if history.exists() {
        atomic_write(&history, b"")?;
    }
    Ok(())
}

fn format_snapshot(s: &StatsSnapshot) -> String {
    format!(
        "Compressions: {}\n\
         Original tokens: {}\n\
         Compressed tokens: {}\n\
         Overall compression: {:.1}%\n\
         Cache hits: {}\n\
         Cache misses: {}\n\
         Cache hit rate: {:.1}%",
        s.compressions,
        s.total_original_tokens,
        s.total_compressed_tokens,
        s.overall_compression_percent,
        s.cache_hits,
        s.cache_misses,
        s.cache_hit_rate
    )
}

pub fn run(reset_history: bool, json: bool) -> anyhow::Result<()> {
    let paths = Paths::new()?;

    if reset_history {
        reset(&paths)?;
        println!("Statistics reset");
        return Ok(());
    }

    let snapshot = load(&paths)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else if snapshot.compressions == 0 && snapshot.cache_hits == 0 {
        println!("No compressions recorded");
    } else {
        println!("{}", format_snapshot(&snapshot));
    }
    Ok(())
}
