use std::path::Path;

use condense_core::Config;
use condense_telemetry::Paths;

use super::{load_settings, read_input};

pub(crate) struct Estimate {
    pub chars: usize,
    pub tokens: usize,
    pub cost_usd: f64,
}

pub(crate) fn estimate(text: &str, config: &Config) -> Estimate {
    let tokens = config.estimate_tokens(text);
    Estimate {
        chars: text.chars().count(),
        tokens,
        cost_usd: config.estimate_cost(tokens),
    }
}

pub fn run(file: &Path) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let config = load_settings(&paths).compress;
    let text = read_input(file, &config)?;
    let est = estimate(&text, &config);

    println!("File: {}", file.display());
    println!("Characters: {}", est.chars);
    println!("Estimated tokens: ~{}", est.tokens);
    println!(
        "Estimated input cost: ${:.4} (at ${:.2}/M tokens)",
        est.cost_usd, config.price_per_million_tokens
    );
    Ok(())
}
