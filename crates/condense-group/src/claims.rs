//! Self-referential claims that can be checked against the transcript

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

use crate::types::{Claim, ClaimType, Turn};
use crate::votes::parse_choice;

static DENIAL_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static COUNT_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn denial_patterns() -> &'static [Regex] {
    DENIAL_PATTERNS.get_or_init(|| {
        [
            r"(?i)\b(?:i\s+)?(?:wasn['’]t|was\s+not|was\s+never|never\s+was|haven['’]t\s+been|have\s+not\s+been)\s+@?mentioned\b",
            r"(?i)\bno\s+one\s+(?:@?mentioned|tagged)\s+me\b",
            r"(?i)\bdidn['’]t\s+see\s+(?:any\s+)?@?mentions?\b",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

/// Each captures the count as `n` and, when the claim names a choice, the
/// text it starts as `rest`
fn count_patterns() -> &'static [Regex] {
    COUNT_PATTERNS.get_or_init(|| {
        [
            r"(?i)\bthere\s+(?:are|were)\s+(?P<n>\d+)\s+votes?(?:[ \t]+(?:total\b|for[ \t]+(?P<rest>.*)))?",
            r"(?i)\b(?P<n>\d+)\s+votes?[ \t]+(?:total\b|for[ \t]+(?P<rest>.*))",
            r"(?i)\bthe\s+count\s+is\s+(?P<n>\d+)",
            r"(?i)\b(?P<n>\d+)\s+(?:agents?|people)\s+voted\b",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

#[derive(Debug)]
struct Found {
    start: usize,
    end: usize,
    claim_type: ClaimType,
    count: Option<usize>,
    choice: Option<String>,
}

fn find_claims(body: &str) -> Vec<Found> {
    let mut found: Vec<Found> = Vec::new();
    let overlaps = |found: &[Found], start: usize, end: usize| {
        found.iter().any(|f| start < f.end && f.start < end)
    };

    for re in denial_patterns() {
        for m in re.find_iter(body) {
            if !overlaps(&found, m.start(), m.end()) {
                found.push(Found {
                    start: m.start(),
                    end: m.end(),
                    claim_type: ClaimType::MentionDenial,
                    count: None,
                    choice: None,
                });
            }
        }
    }

    for re in count_patterns() {
        for caps in re.captures_iter(body) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let Some(count) = caps.name("n").and_then(|n| n.as_str().parse::<usize>().ok()) else {
                continue;
            };
            let (choice, end) = match caps.name("rest") {
                Some(rest) => match parse_choice(rest.as_str()) {
                    Some((choice, len)) => (Some(choice), rest.start() + len),
                    None => (None, rest.start()),
                },
                None => (None, whole.end()),
            };
            if !overlaps(&found, whole.start(), end) {
                found.push(Found {
                    start: whole.start(),
                    end,
                    claim_type: ClaimType::VoteCount,
                    count: Some(count),
                    choice,
                });
            }
        }
    }

    found.sort_by_key(|f| f.start);
    found
}

/// Byte spans of the claims in `body`
pub(crate) fn claim_spans(body: &str) -> Vec<Range<usize>> {
    find_claims(body).into_iter().map(|f| f.start..f.end).collect()
}

/// Claims in transcript order, numbered `C1`, `C2`, ...
pub fn extract_claims(turns: &[Turn]) -> Vec<Claim> {
    let mut claims = Vec::new();
    for turn in turns {
        for found in find_claims(&turn.raw_text) {
            claims.push(Claim {
                claim_id: format!("C{}", claims.len() + 1),
                speaker: turn.speaker.clone(),
                claim_text: turn.raw_text[found.start..found.end].trim().to_string(),
                position: turn.position,
                claim_type: found.claim_type,
                asserted_count: found.count,
                asserted_choice: found.choice,
                verified: None,
            });
        }
    }
    claims
}
