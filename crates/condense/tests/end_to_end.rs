mod common;

use common::{isolated_compressor, numbered_lines, REVIEW_TRANSCRIPT};
use condense_compress::CompressRequest;
use condense_core::{CommentStyle, Config, ContentCategory, Method};
use condense_group::{compress_group_conversation, Analyzer, Severity};
use condense_telemetry::Stats;
use std::collections::BTreeMap;
use std::sync::Arc;

#[test]
fn test_scenario_mention_graph() {
    let result = compress_group_conversation("A: hello\nB: @A hi", None).unwrap();
    let expected: BTreeMap<String, BTreeMap<String, usize>> =
        BTreeMap::from([("B".to_string(), BTreeMap::from([("A".to_string(), 1)]))]);
    assert_eq!(result.mention_graph.adjacency(), expected);
    assert_eq!(result.unique_agents, 2);
    assert_eq!(result.total_messages, 2);
}

#[test]
fn test_scenario_vote_tally() {
    let result =
        compress_group_conversation("A: I vote X\nB: +1 for X\nC: I vote Y", None).unwrap();
    let general = &result.votes["General"];
    assert_eq!(general.len(), 2);
    assert_eq!(general["X"], 2);
    assert_eq!(general["Y"], 1);
}

#[test]
fn test_scenario_strip_collapses_blanks() {
    let (compressor, _) = isolated_compressor();
    let text = "# comment\ncode()\n\n\n\nmore()";
    let request = CompressRequest::text(text, None, Method::Strip)
        .with_category(ContentCategory::Code(CommentStyle::Hash));
    let out = compressor.compress(&request).unwrap();
    assert_eq!(out.text, "code()\n\nmore()");
    assert_eq!(out.result.method(), Method::Strip);
}

#[test]
fn test_scenario_relevant_window() {
    let (compressor, _) = isolated_compressor();
    let text = numbered_lines(100, 50, "check auth token");
    let (out, result) = compressor
        .compress_text(&text, Some("auth"), Method::Relevant)
        .unwrap();

    let expected: Vec<String> = (45..=55)
        .map(|i| {
            if i == 50 {
                "line 50 check auth token".to_string()
            } else {
                format!("line {}", i)
            }
        })
        .collect();
    assert_eq!(out, expected.join("\n"));
    assert_eq!(result.method(), Method::Relevant);
    assert!(result.compressed_size() < result.original_size());
}

#[test]
fn test_auto_on_file_uses_extension() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("settings.py");
    std::fs::write(&path, "# comment\ncode()\n\n\n\nmore()").unwrap();

    let (compressor, _) = isolated_compressor();
    let out = compressor.compress_file(&path, None, Method::Auto).unwrap();
    assert_eq!(out.result.method(), Method::Strip);
    assert_eq!(out.text, "code()\n\nmore()");
}

#[test]
fn test_review_transcript_analysis() {
    let analyzer = Analyzer::new(Config::new()).with_stats(Arc::new(Stats::new()));
    let result = analyzer.compress(REVIEW_TRANSCRIPT, Some("dev")).unwrap();

    assert_eq!(result.total_messages, 6);
    assert_eq!(result.unique_agents, 4);
    assert!(result.parse_ambiguities.is_empty());

    let general = &result.votes["General"];
    assert_eq!(general["Option A"], 2);
    assert_eq!(general["Option B"], 1);

    assert_eq!(result.contradictions.len(), 2);
    assert_eq!(result.contradictions[0].claim_id, "C1");
    assert_eq!(result.contradictions[0].severity, Severity::High);
    assert_eq!(result.contradictions[1].severity, Severity::Medium);
    assert_eq!(result.claims["C2"].asserted_count, Some(3));

    let focus = result.focus.as_ref().unwrap();
    assert_eq!(focus.agent, "DEV");
    assert_eq!(focus.participation_count, 2);
    assert!(result.summary.contains("Group conversation with 4 agents, 6 messages."));
}

#[test]
fn test_contradictions_ignore_later_turns() {
    // The mention arrives after the denial, so the denial holds
    let raw = "B: I wasn't mentioned\nA: @B now you are";
    let result = compress_group_conversation(raw, None).unwrap();
    assert!(result.contradictions.is_empty());
    assert_eq!(result.claims["C1"].verified, Some(true));
}

#[test]
fn test_revote_counts_latest_choice() {
    let raw = "A: I vote X\nB: I vote X\nA: actually I vote Y";
    let result = compress_group_conversation(raw, None).unwrap();
    let general = &result.votes["General"];
    assert_eq!(general["X"], 1);
    assert_eq!(general["Y"], 1);
    assert_eq!(result.vote_details.len(), 3);
    assert!(result.vote_details[0].superseded);
}
