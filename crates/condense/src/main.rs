mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::group::View;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compress {
            file,
            query,
            method,
            json,
        } => commands::compress::run(&file, query.as_deref(), &method, json),
        Commands::Estimate { file } => commands::estimate::run(&file),
        Commands::Stats { reset, json } => commands::stats::run(reset, json),
        Commands::ClearCache => commands::clear_cache::run(),
        Commands::Group {
            file,
            focus,
            agents,
            mentions,
            votes,
            contradictions,
            json,
        } => {
            let view = View::from_flags(mentions, votes, contradictions, json);
            commands::group::run(&file, focus.as_deref(), &agents, view)
        }
        Commands::Version => commands::version::run(),
    }
}
