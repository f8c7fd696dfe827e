use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "condense")]
#[command(version)]
#[command(about = "Compress source files, documents and multi-agent transcripts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress a file
    Compress {
        file: PathBuf,

        /// Keep only lines around matches of this text
        #[arg(short, long)]
        query: Option<String>,

        /// auto, relevant, summary or strip
        #[arg(short, long, default_value = "auto")]
        method: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate tokens and input cost for a file
    Estimate { file: PathBuf },

    /// Show compression statistics from the usage history
    Stats {
        /// Clear the usage history
        #[arg(long)]
        reset: bool,

        #[arg(long)]
        json: bool,
    },

    /// Remove every cached compression
    ClearCache,

    /// Analyze a multi-agent conversation transcript
    Group {
        file: PathBuf,

        /// Agent whose pending mentions lead the summary
        #[arg(long)]
        focus: Option<String>,

        /// Comma-separated agent names; replaces detection from the transcript
        #[arg(long, value_delimiter = ',')]
        agents: Vec<String>,

        /// Print only the mention graph
        #[arg(long, conflicts_with_all = ["votes", "contradictions", "json"])]
        mentions: bool,

        /// Print only the vote tallies
        #[arg(long, conflicts_with_all = ["contradictions", "json"])]
        votes: bool,

        /// Print only detected contradictions
        #[arg(long, conflicts_with = "json")]
        contradictions: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print version information
    Version,
}
