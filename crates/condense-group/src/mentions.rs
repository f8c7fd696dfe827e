//! `@NAME` mention extraction and the acknowledgment heuristic

use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::sync::OnceLock;

use crate::types::{MentionEdge, Turn};

static MENTION_RE: OnceLock<Regex> = OnceLock::new();

/// Characters of context kept on each side of a mention marker
const CONTEXT_CHARS: usize = 50;

fn mention_re() -> &'static Regex {
    MENTION_RE.get_or_init(|| {
        Regex::new(r"(?:^|[^\w@])@([A-Za-z][A-Za-z0-9_]*(?:-[A-Za-z0-9_]+)*)").unwrap()
    })
}

/// Byte ranges of the body that sit inside ``` fences. An unclosed fence
/// runs to the end.
fn fenced_ranges(body: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut open = None;
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.trim_start().starts_with("```") {
            match open.take() {
                Some(start) => ranges.push(start..offset + line.len()),
                None => open = Some(offset),
            }
        }
        offset += line.len();
    }
    if let Some(start) = open {
        ranges.push(start..body.len());
    }
    ranges
}

/// `(marker start, marker end, name)` for every `@NAME` outside code fences
fn markers(body: &str) -> impl Iterator<Item = (usize, usize, &str)> {
    let fences = fenced_ranges(body);
    mention_re()
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|name| (name.start() - 1, name.end(), name.as_str()))
        .filter(move |(start, _, _)| !fences.iter().any(|r| r.contains(start)))
}

fn context(body: &str, start: usize, end: usize) -> String {
    let from = body[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map_or(0, |(i, _)| i);
    let to = body[end..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map_or(body.len(), |(i, _)| end + i);
    body[from..to].trim().to_string()
}

/// Names that count as mention targets.
///
/// A non-empty `configured` list replaces detection. Otherwise the set is
/// every speaker plus every `@NAME` written entirely in uppercase, so
/// decorators such as `@dataclass` or `@Override` stay out.
pub fn known_agents(turns: &[Turn], configured: &[String]) -> BTreeSet<String> {
    let configured: BTreeSet<String> = configured
        .iter()
        .map(|name| name.trim().trim_start_matches('@').to_uppercase())
        .filter(|name| !name.is_empty())
        .collect();
    if !configured.is_empty() {
        return configured;
    }

    let mut agents: BTreeSet<String> = turns.iter().map(|t| t.speaker.clone()).collect();
    for turn in turns {
        agents.extend(
            markers(&turn.raw_text)
                .filter(|(_, _, name)| !name.chars().any(|c| c.is_ascii_lowercase()))
                .map(|(_, _, name)| name.to_string()),
        );
    }
    agents
}

/// One edge per `@NAME` in the turn body naming a known agent, duplicates
/// included.
///
/// A marker preceded by a word character or another `@` is skipped, so
/// e-mail addresses do not count. Markers inside code fences are ignored.
pub fn extract_mentions(turn: &Turn, agents: &BTreeSet<String>) -> Vec<MentionEdge> {
    let body = &turn.raw_text;
    markers(body)
        .filter_map(|(start, end, name)| {
            let to = name.to_uppercase();
            agents.contains(&to).then(|| MentionEdge {
                from: turn.speaker.clone(),
                to,
                position: turn.position,
                acknowledged: false,
                context: context(body, start, end),
            })
        })
        .collect()
}

/// Mentions across the whole conversation, in turn order
pub fn mentions_in(turns: &[Turn], configured: &[String]) -> Vec<MentionEdge> {
    let agents = known_agents(turns, configured);
    turns
        .iter()
        .flat_map(|turn| extract_mentions(turn, &agents))
        .collect()
}

/// Mark each edge acknowledged when its target authors a turn after it and
/// before the next mention aimed at them.
///
/// This is an approximation: any reply in that window counts, whatever it
/// talks about.
pub fn mark_acknowledged(edges: &mut [MentionEdge], turns: &[Turn]) {
    let mut spoke: HashMap<&str, Vec<usize>> = HashMap::new();
    for turn in turns {
        spoke
            .entry(turn.speaker.as_str())
            .or_default()
            .push(turn.position);
    }
    let mut mentioned: HashMap<String, Vec<usize>> = HashMap::new();
    for edge in edges.iter() {
        mentioned
            .entry(edge.to.clone())
            .or_default()
            .push(edge.position);
    }

    for edge in edges.iter_mut() {
        let p = edge.position;
        let next_mention = mentioned
            .get(&edge.to)
            .and_then(|ps| ps.iter().copied().find(|&q| q > p));
        let reply = spoke
            .get(edge.to.as_str())
            .and_then(|ps| ps.iter().copied().find(|&q| q > p));
        edge.acknowledged = match (reply, next_mention) {
            (Some(r), Some(n)) => r < n,
            (Some(_), None) => true,
            (None, _) => false,
        };
    }
}
