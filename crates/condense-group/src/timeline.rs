//! Per-turn timeline

use crate::types::{Claim, MentionGraph, TimelineEntry, TimelineEvent, Turn, Vote};

/// First sentence of `body`, cut at `max_chars` with `...` appended.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace, or at a newline.
pub fn first_sentence(body: &str, max_chars: usize) -> String {
    let mut end = body.len();
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\n' {
            end = i;
            break;
        }
        if matches!(c, '.' | '!' | '?') && chars.peek().is_none_or(|(_, next)| next.is_whitespace()) {
            end = i + c.len_utf8();
            break;
        }
    }
    let sentence = body[..end].trim();
    match sentence.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &sentence[..cut]),
        None => sentence.to_string(),
    }
}

/// One entry per turn, tagged with the mentions, votes and claims it holds
pub fn build_timeline(
    turns: &[Turn],
    graph: &MentionGraph,
    votes: &[Vote],
    claims: &[Claim],
    summary_chars: usize,
) -> Vec<TimelineEntry> {
    turns
        .iter()
        .map(|turn| {
            let p = turn.position;
            let mentions = graph
                .edges()
                .iter()
                .filter(|e| e.position == p)
                .map(|e| TimelineEvent::Mention { to: e.to.clone() });
            let cast = votes
                .iter()
                .filter(|v| v.position == p)
                .map(|v| TimelineEvent::Vote {
                    topic: v.topic.clone(),
                    choice: v.choice.clone(),
                });
            let made = claims
                .iter()
                .filter(|c| c.position == p)
                .map(|c| TimelineEvent::Claim {
                    claim_id: c.claim_id.clone(),
                });
            let events: Vec<TimelineEvent> = mentions.chain(cast).chain(made).collect();

            TimelineEntry {
                position: p,
                speaker: turn.speaker.clone(),
                timestamp: turn.timestamp.clone(),
                summary: first_sentence(&turn.raw_text, summary_chars),
                coordination: !events.is_empty(),
                events,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::extract_claims;
    use crate::mentions::mentions_in;
    use crate::parser::parse;
    use crate::votes::collect_votes;

    #[test]
    fn test_first_sentence() {
        assert_eq!(first_sentence("Hello there. More text", 80), "Hello there.");
        assert_eq!(first_sentence("Really? Yes", 80), "Really?");
        assert_eq!(first_sentence("line one\nline two", 80), "line one");
        assert_eq!(first_sentence("version 1.2 is out", 80), "version 1.2 is out");
        assert_eq!(first_sentence("Done!", 80), "Done!");
    }

    #[test]
    fn test_first_sentence_is_capped() {
        let long = "a".repeat(100);
        let summary = first_sentence(&long, 80);
        assert_eq!(summary.chars().count(), 83);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_timeline_events() {
        let turns: Vec<Turn> =
            parse("A: hello\nB: @A I vote X\nA: I wasn't mentioned, right?").collect();
        let graph = MentionGraph::new(mentions_in(&turns, &[]));
        let votes = collect_votes(&turns);
        let claims = extract_claims(&turns);
        let timeline = build_timeline(&turns, &graph, &votes, &claims, 80);

        assert_eq!(timeline.len(), 3);
        assert!(!timeline[0].coordination);
        assert_eq!(
            timeline[1].events,
            vec![
                TimelineEvent::Mention {
                    to: "A".to_string()
                },
                TimelineEvent::Vote {
                    topic: "General".to_string(),
                    choice: "X".to_string()
                },
            ]
        );
        assert_eq!(
            timeline[2].events,
            vec![TimelineEvent::Claim {
                claim_id: "C1".to_string()
            }]
        );
        assert_eq!(timeline[2].summary, "I wasn't mentioned, right?");
    }

    #[test]
    fn test_entries_keep_turn_timestamps() {
        let turns: Vec<Turn> = parse("A: [2025-03-01 14:05] shipped\nB: ok").collect();
        let graph = MentionGraph::new(Vec::new());
        let timeline = build_timeline(&turns, &graph, &[], &[], 80);
        assert_eq!(timeline[0].timestamp.as_deref(), Some("2025-03-01 14:05"));
        assert_eq!(timeline[1].timestamp, None);
    }
}
