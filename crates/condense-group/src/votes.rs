//! Vote extraction and tallying

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::claims::claim_spans;
use crate::types::{Turn, Vote, VoteTally};

pub const DEFAULT_TOPIC: &str = "General";

const MAX_CHOICE_CHARS: usize = 50;
const PRONOUNS: &[&str] = &["it", "this", "that", "them"];

static CHOICE_RE: OnceLock<Regex> = OnceLock::new();
static TOPIC_TAG_RE: OnceLock<Regex> = OnceLock::new();
static VOTE_ON_RE: OnceLock<Regex> = OnceLock::new();
static VOTE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Title-case each word; `None` for pronouns and overlong choices
fn normalize_choice(raw: &str) -> Option<String> {
    let choice = raw
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ");
    if choice.is_empty()
        || choice.chars().count() > MAX_CHOICE_CHARS
        || PRONOUNS.contains(&choice.to_lowercase().as_str())
    {
        return None;
    }
    Some(choice)
}

/// Choice at the start of `rest`: the first word plus any capitalized words
/// after it. Returns the normalized choice and the bytes it spans.
pub(crate) fn parse_choice(rest: &str) -> Option<(String, usize)> {
    let re = CHOICE_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9][\w-]*(?:[ \t]+[A-Z0-9][\w-]*)*").unwrap());
    let m = re.find(rest)?;
    normalize_choice(m.as_str()).map(|choice| (choice, m.end()))
}

/// Patterns in priority order. Each captures either `choice` directly or the
/// `rest` of the line the choice starts.
fn vote_patterns() -> &'static [Regex] {
    VOTE_PATTERNS.get_or_init(|| {
        [
            r"\b(?P<choice>(?:[A-Z][\w-]*[ \t]+)?[A-Za-z0-9][\w-]*)[ \t]+(?i:gets?\s+my\s+vote)\b",
            r"(?i:\bmy\s+vote\s*:)[ \t]*(?P<rest>.*)",
            r"\+1[ \t]+(?i:for[ \t]+)?(?P<rest>.*)",
            r"(?i:\bi\s+vote(?:\s+for)?|\bvote\s+for)[ \t]+(?P<rest>.*)",
            r"(?i:\bi\s+support)[ \t]+(?P<rest>.*)",
            r"(?i:\bi\s+(?:choose|pick|select))[ \t]+(?P<rest>.*)",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Topic from a leading `[Topic]` tag on the body
fn tagged_topic(body: &str) -> Option<String> {
    let re = TOPIC_TAG_RE.get_or_init(|| Regex::new(r"^\[([^\]\n]+)\]").unwrap());
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// The turn's vote, if any. At most one per turn; the highest-priority
/// matching pattern wins.
///
/// Text inside a vote-count claim ("so far 1 vote for X") is a report, not a
/// vote, and is skipped.
pub fn extract_vote(turn: &Turn) -> Option<Vote> {
    let body = turn.raw_text.as_str();
    let claims = claim_spans(body);
    let in_claim =
        |start: usize, end: usize| claims.iter().any(|c| start < c.end && c.start < end);
    let vote = |topic: String, choice: String, raw: &str| Vote {
        voter: turn.speaker.clone(),
        topic,
        choice,
        position: turn.position,
        raw_text: raw.trim().to_string(),
        superseded: false,
    };

    let vote_on = VOTE_ON_RE.get_or_init(|| {
        Regex::new(r"(?i:\bvote\s+on\s+)(?P<topic>[^:\n]+?)[ \t]*:[ \t]*(?P<rest>.*)").unwrap()
    });
    for caps in vote_on.captures_iter(body) {
        let (Some(whole), Some(topic), Some(rest)) =
            (caps.get(0), caps.name("topic"), caps.name("rest"))
        else {
            continue;
        };
        if let Some((choice, len)) = parse_choice(rest.as_str()) {
            if !in_claim(whole.start(), rest.start() + len) {
                return Some(vote(topic.as_str().trim().to_string(), choice, whole.as_str()));
            }
        }
    }

    let topic = tagged_topic(body).unwrap_or_else(|| DEFAULT_TOPIC.to_string());
    for re in vote_patterns() {
        for caps in re.captures_iter(body) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let choice = match (caps.name("choice"), caps.name("rest")) {
                (Some(m), _) => normalize_choice(m.as_str()).map(|c| (c, whole.end())),
                (None, Some(m)) => parse_choice(m.as_str()).map(|(c, len)| (c, m.start() + len)),
                (None, None) => None,
            };
            if let Some((choice, end)) = choice {
                if !in_claim(whole.start(), end) {
                    return Some(vote(topic, choice, whole.as_str()));
                }
            }
        }
    }
    None
}

/// Votes in turn order. A re-vote by the same voter on the same topic marks
/// the earlier record superseded.
pub fn collect_votes(turns: &[Turn]) -> Vec<Vote> {
    let mut votes: Vec<Vote> = Vec::new();
    let mut latest: HashMap<(String, String), usize> = HashMap::new();
    for vote in turns.iter().filter_map(extract_vote) {
        let key = (vote.voter.clone(), vote.topic.clone());
        if let Some(prev) = latest.insert(key, votes.len()) {
            votes[prev].superseded = true;
        }
        votes.push(vote);
    }
    votes
}

/// Each voter's latest vote per topic among votes cast strictly before
/// `position`, in transcript order
pub fn counted_before(votes: &[Vote], position: usize) -> Vec<&Vote> {
    let mut latest: HashMap<(&str, &str), &Vote> = HashMap::new();
    for vote in votes.iter().filter(|v| v.position < position) {
        latest.insert((vote.voter.as_str(), vote.topic.as_str()), vote);
    }
    let mut counted: Vec<&Vote> = latest.into_values().collect();
    counted.sort_by_key(|v| v.position);
    counted
}

/// topic -> choice -> voters, counting only votes that were not replaced
pub fn tally<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> VoteTally {
    let mut tally = VoteTally::new();
    for vote in votes.into_iter().filter(|v| !v.superseded) {
        *tally
            .entry(vote.topic.clone())
            .or_default()
            .entry(vote.choice.clone())
            .or_insert(0) += 1;
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(speaker: &str, position: usize, text: &str) -> Turn {
        Turn::new(speaker, position, text)
    }

    fn choice(text: &str) -> Option<String> {
        extract_vote(&turn("A", 0, text)).map(|v| v.choice)
    }

    #[test]
    fn test_each_pattern() {
        assert_eq!(choice("I vote X").as_deref(), Some("X"));
        assert_eq!(choice("I vote for postgres.").as_deref(), Some("Postgres"));
        assert_eq!(choice("+1 for X").as_deref(), Some("X"));
        assert_eq!(choice("My vote: Option B").as_deref(), Some("Option B"));
        assert_eq!(choice("I support redis here").as_deref(), Some("Redis"));
        assert_eq!(choice("i pick Blue").as_deref(), Some("Blue"));
        assert_eq!(choice("Honestly, Rust gets my vote").as_deref(), Some("Rust"));
        assert_eq!(choice("Let's all vote for Plan A").as_deref(), Some("Plan A"));
    }

    #[test]
    fn test_no_vote() {
        assert_eq!(choice("I voted yesterday"), None);
        assert_eq!(choice("nothing to see"), None);
    }

    #[test]
    fn test_pronoun_rejected() {
        assert_eq!(choice("I support that"), None);
        assert_eq!(choice("I vote for it"), None);
    }

    #[test]
    fn test_overlong_choice_rejected() {
        let long = format!("I vote {}", "Abcdefghij ".repeat(6));
        assert_eq!(choice(&long), None);
    }

    #[test]
    fn test_priority_picks_one_vote() {
        let vote = extract_vote(&turn("A", 0, "Rust gets my vote, I vote Go too")).unwrap();
        assert_eq!(vote.choice, "Rust");
    }

    #[test]
    fn test_count_report_is_not_a_vote() {
        assert_eq!(choice("so far 1 vote for X"), None);
        assert_eq!(choice("I vote Y, so far 1 vote for X").as_deref(), Some("Y"));

        let turns = vec![turn("A", 0, "I vote X"), turn("B", 1, "so far 1 vote for X")];
        let tally = tally(&collect_votes(&turns));
        assert_eq!(tally["General"]["X"], 1);
    }

    #[test]
    fn test_topics() {
        let tagged = extract_vote(&turn("A", 0, "[Database] I vote Postgres")).unwrap();
        assert_eq!(tagged.topic, "Database");
        let named = extract_vote(&turn("A", 0, "My vote on storage: sqlite")).unwrap();
        assert_eq!(named.topic, "storage");
        assert_eq!(named.choice, "Sqlite");
        let default = extract_vote(&turn("A", 0, "I vote X")).unwrap();
        assert_eq!(default.topic, DEFAULT_TOPIC);
    }

    #[test]
    fn test_tally_counts_distinct_voters() {
        let turns = vec![
            turn("A", 0, "I vote X"),
            turn("B", 1, "+1 for X"),
            turn("C", 2, "I vote Y"),
        ];
        let tally = tally(&collect_votes(&turns));
        assert_eq!(tally["General"]["X"], 2);
        assert_eq!(tally["General"]["Y"], 1);
    }

    #[test]
    fn test_revote_replaces_earlier_choice() {
        let turns = vec![turn("A", 0, "I vote X"), turn("A", 1, "I vote Y")];
        let votes = collect_votes(&turns);
        assert_eq!(votes.len(), 2);
        assert!(votes[0].superseded);
        assert!(!votes[1].superseded);

        let tally = tally(&votes);
        assert_eq!(tally["General"].get("X"), None);
        assert_eq!(tally["General"]["Y"], 1);
    }

    #[test]
    fn test_revote_in_other_topic_is_kept() {
        let turns = vec![
            turn("A", 0, "I vote X"),
            turn("A", 1, "[Color] I vote Red"),
        ];
        let votes = collect_votes(&turns);
        assert!(votes.iter().all(|v| !v.superseded));
    }

    #[test]
    fn test_counted_before_uses_latest_prior_vote() {
        let turns = vec![
            turn("A", 0, "I vote X"),
            turn("B", 1, "I vote X"),
            turn("A", 2, "I vote Y"),
            turn("C", 3, "I vote Z"),
        ];
        let votes = collect_votes(&turns);
        let counted = counted_before(&votes, 3);
        let picks: Vec<(&str, &str)> = counted
            .iter()
            .map(|v| (v.voter.as_str(), v.choice.as_str()))
            .collect();
        assert_eq!(picks, vec![("B", "X"), ("A", "Y")]);
        assert!(counted_before(&votes, 0).is_empty());
    }
}
