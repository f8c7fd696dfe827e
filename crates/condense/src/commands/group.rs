use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use condense_group::{Analyzer, ConversationCompressionResult};
use condense_telemetry::{Paths, Stats, UsageRecord};

use super::{load_settings, read_input, record_usage};

/// What `condense group` prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Digest,
    Mentions,
    Votes,
    Contradictions,
    Json,
}

impl View {
    /// Flags are mutually exclusive at the parser; the digest is the default
    pub fn from_flags(mentions: bool, votes: bool, contradictions: bool, json: bool) -> Self {
        if mentions {
            View::Mentions
        } else if votes {
            View::Votes
        } else if contradictions {
            View::Contradictions
        } else if json {
            View::Json
        } else {
            View::Digest
        }
    }
}

fn render_mentions(result: &ConversationCompressionResult) -> String {
    let graph = &result.mention_graph;
    if graph.is_empty() {
        return "No mentions".to_string();
    }
    let mut out = String::new();
    for (from, targets) in graph.adjacency() {
        for (to, count) in targets {
            let _ = writeln!(out, "{} -> @{}: {}", from, to, count);
        }
    }
    let pending: Vec<_> = graph.edges().iter().filter(|e| !e.acknowledged).collect();
    if !pending.is_empty() {
        let _ = writeln!(out, "\nUnacknowledged:");
        for edge in pending {
            let _ = writeln!(out, "  @{} by {} at msg#{}", edge.to, edge.from, edge.position);
        }
    }
    out.trim_end().to_string()
}

fn render_votes(result: &ConversationCompressionResult) -> String {
    if result.votes.is_empty() {
        return "No votes".to_string();
    }
    let mut out = String::new();
    for (topic, choices) in &result.votes {
        let _ = writeln!(out, "{}:", topic);
        let mut rows: Vec<_> = choices.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (choice, count) in rows {
            let _ = writeln!(out, "  {}: {}", choice, count);
        }
    }
    out.trim_end().to_string()
}

fn render_contradictions(result: &ConversationCompressionResult) -> String {
    if result.contradictions.is_empty() {
        return "No contradictions".to_string();
    }
    let mut out = String::new();
    for c in &result.contradictions {
        let _ = writeln!(
            out,
            "[{}] {} ({})",
            c.severity.as_str().to_uppercase(),
            c.contradiction_type.as_str(),
            c.claim_id
        );
        if let Some(claim) = result.claims.get(&c.claim_id) {
            let _ = writeln!(
                out,
                "  {} at msg#{}: \"{}\"",
                claim.speaker, claim.position, claim.claim_text
            );
        }
        let _ = writeln!(out, "  {}", c.fact_description);
    }
    out.trim_end().to_string()
}

pub(crate) fn render(result: &ConversationCompressionResult, view: View) -> anyhow::Result<String> {
    Ok(match view {
        View::Digest => format!("{}\n\n{}", result.compressed_text, result.summary),
        View::Mentions => render_mentions(result),
        View::Votes => render_votes(result),
        View::Contradictions => render_contradictions(result),
        View::Json => serde_json::to_string_pretty(result)?,
    })
}

/// Analyze `file`. A non-empty `agents` overrides the configured agent list.
pub(crate) fn execute(
    paths: &Paths,
    file: &Path,
    focus: Option<&str>,
    agents: &[String],
) -> anyhow::Result<ConversationCompressionResult> {
    let mut settings = load_settings(paths);
    if !agents.is_empty() {
        settings.group.agents = agents.to_vec();
    }
    let raw = read_input(file, &settings.compress)?;

    let per_token = settings.compress.chars_per_token.max(1);
    let analyzer = Analyzer::new(settings.compress)
        .with_analysis(settings.group)
        .with_stats(Arc::new(Stats::new()));
    let result = analyzer.compress(&raw, focus)?;

    record_usage(
        paths,
        &UsageRecord::new(
            &format!("group:{}", file.display()),
            "group",
            raw.chars().count() / per_token,
            result.compressed_size / per_token,
        ),
    );
    Ok(result)
}

pub fn run(
    file: &Path,
    focus: Option<&str>,
    agents: &[String],
    view: View,
) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let result = execute(&paths, file, focus, agents)?;
    println!("{}", render(&result, view)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use condense_telemetry::read_jsonl;

    const TRANSCRIPT: &str = "\
ALICE: @BOB can you check the build?
BOB: I vote for option A
CAROL: +1 for option A
BOB: I wasn't mentioned by anyone
CAROL: there are 3 votes for option A";

    fn analyze() -> ConversationCompressionResult {
        Analyzer::new(condense_core::Config::new())
            .with_stats(Arc::new(Stats::new()))
            .compress(TRANSCRIPT, None)
            .unwrap()
    }

    #[test]
    fn test_view_from_flags() {
        assert_eq!(View::from_flags(false, false, false, false), View::Digest);
        assert_eq!(View::from_flags(true, false, false, false), View::Mentions);
        assert_eq!(View::from_flags(false, true, false, false), View::Votes);
        assert_eq!(View::from_flags(false, false, true, false), View::Contradictions);
        assert_eq!(View::from_flags(false, false, false, true), View::Json);
    }

    #[test]
    fn test_render_mentions_view() {
        let text = render(&analyze(), View::Mentions).unwrap();
        assert!(text.starts_with("ALICE -> @BOB: 1"));
        assert!(!text.contains("Unacknowledged"));
    }

    #[test]
    fn test_render_votes_view() {
        let text = render(&analyze(), View::Votes).unwrap();
        assert_eq!(text, "General:\n  Option A: 2");
    }

    #[test]
    fn test_render_contradictions_view() {
        let text = render(&analyze(), View::Contradictions).unwrap();
        assert!(text.contains("[HIGH] mention_denial (C1)"));
        assert!(text.contains("[MEDIUM] vote_count (C2)"));
    }

    #[test]
    fn test_render_json_view_parses() {
        let text = render(&analyze(), View::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["total_messages"], 5);
    }

    #[test]
    fn test_render_empty_views() {
        let empty = Analyzer::new(condense_core::Config::new())
            .with_stats(Arc::new(Stats::new()))
            .compress("A: hello", None)
            .unwrap();
        assert_eq!(render(&empty, View::Mentions).unwrap(), "No mentions");
        assert_eq!(render(&empty, View::Votes).unwrap(), "No votes");
        assert_eq!(render(&empty, View::Contradictions).unwrap(), "No contradictions");
    }

    #[test]
    fn test_execute_records_usage() {
        let home = tempfile::TempDir::new().unwrap();
        let paths = Paths::at(home.path());
        let file = home.path().join("chat.md");
        std::fs::write(&file, TRANSCRIPT).unwrap();

        let result = execute(&paths, &file, Some("bob"), &[]).unwrap();
        assert_eq!(result.focus.unwrap().agent, "BOB");

        let records: Vec<UsageRecord> = read_jsonl(&paths.history_file()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].method, "group");
        assert!(records[0].source.starts_with("group:"));
        assert!(!records[0].cached);
    }

    #[test]
    fn test_execute_agents_override() {
        let home = tempfile::TempDir::new().unwrap();
        let paths = Paths::at(home.path());
        let file = home.path().join("chat.md");
        std::fs::write(&file, TRANSCRIPT).unwrap();

        let result = execute(&paths, &file, None, &["carol".to_string()]).unwrap();
        assert!(result.mention_graph.is_empty());
        assert_eq!(render(&result, View::Mentions).unwrap(), "No mentions");
    }
}
