//! Transcript parsing into speaker turns

use regex::Regex;
use std::iter::{Enumerate, FusedIterator};
use std::str::Split;
use std::sync::OnceLock;
use tracing::debug;

use crate::types::{AmbiguityReason, ParseAmbiguity, Turn};

static BOLD_RE: OnceLock<Regex> = OnceLock::new();
static BRACKET_RE: OnceLock<Regex> = OnceLock::new();
static PLAIN_RE: OnceLock<Regex> = OnceLock::new();
static TIMESTAMP_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// First timestamp in `body`: a bracketed ISO date-time, a bare
/// `YYYY-MM-DD HH:MM`, an `HH:MM:SS` clock or a parenthesized `(H:MM PM)`
pub fn extract_timestamp(body: &str) -> Option<String> {
    let patterns = TIMESTAMP_PATTERNS.get_or_init(|| {
        [
            r"\[(\d{4}-\d{2}-\d{2}[T\s]\d{2}:\d{2}(?::\d{2})?(?:Z|[+-]\d{2}:?\d{2})?)\]",
            r"(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2})",
            r"(\d{2}:\d{2}:\d{2})",
            r"(?i)\((\d{1,2}:\d{2}\s*(?:AM|PM)?)\)",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });
    patterns
        .iter()
        .find_map(|re| re.captures(body))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `(name, rest of line, is_plain)` when the line opens with a speaker marker.
///
/// Accepted markers: `**NAME:**`, `**NAME**:`, `**NAME (role):**`, `[NAME]`,
/// `[NAME]:` (any case) and plain `NAME:` (uppercase only).
fn speaker_candidate(line: &str) -> Option<(&str, &str, bool)> {
    let bold = BOLD_RE.get_or_init(|| {
        Regex::new(r"^\*\*([A-Za-z][A-Za-z0-9_-]*)(?:\s*\([^)]*\))?(?::\*\*|\*\*:)(.*)$").unwrap()
    });
    let bracket =
        BRACKET_RE.get_or_init(|| Regex::new(r"^\[([A-Za-z][A-Za-z0-9_-]*)\]:?(.*)$").unwrap());
    let plain = PLAIN_RE.get_or_init(|| Regex::new(r"^([A-Z][A-Z0-9_-]*):(.*)$").unwrap());

    for (re, is_plain) in [(bold, false), (bracket, false), (plain, true)] {
        if let Some(caps) = re.captures(line) {
            let name = caps.get(1)?.as_str();
            let rest = caps.get(2).map_or("", |m| m.as_str());
            return Some((name, rest, is_plain));
        }
    }
    None
}

#[derive(Debug, Clone)]
struct Pending<'a> {
    speaker: String,
    body: Vec<&'a str>,
}

/// Lazy iterator over the turns of one transcript.
///
/// Cloning it (or calling [`parse`] again) restarts from the current point
/// without touching any shared state.
#[derive(Debug, Clone)]
pub struct Turns<'a> {
    lines: Enumerate<Split<'a, char>>,
    pending: Option<Pending<'a>>,
    in_fence: bool,
    next_position: usize,
    ambiguities: Vec<ParseAmbiguity>,
}

/// Fully drained parse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parsed {
    pub turns: Vec<Turn>,
    pub ambiguities: Vec<ParseAmbiguity>,
}

/// Split a transcript into turns. Text before the first speaker marker is
/// discarded; turns with empty bodies are skipped.
pub fn parse(raw: &str) -> Turns<'_> {
    Turns {
        lines: raw.split('\n').enumerate(),
        pending: None,
        in_fence: false,
        next_position: 0,
        ambiguities: Vec::new(),
    }
}

impl<'a> Turns<'a> {
    /// Boundary-like lines kept as body text so far
    pub fn ambiguities(&self) -> &[ParseAmbiguity] {
        &self.ambiguities
    }

    /// Drain the remaining turns together with every ambiguity seen
    pub fn finish(mut self) -> Parsed {
        let turns = self.by_ref().collect();
        Parsed {
            turns,
            ambiguities: self.ambiguities,
        }
    }

    fn boundary(&mut self, index: usize, line: &'a str) -> Option<(String, &'a str)> {
        if line.trim_start().starts_with("```") {
            self.in_fence = !self.in_fence;
            return None;
        }

        let (name, rest, is_plain) = speaker_candidate(line)?;
        let reason = if self.in_fence {
            Some(AmbiguityReason::InsideCodeFence)
        } else if is_plain && rest.starts_with("//") {
            Some(AmbiguityReason::UrlScheme)
        } else {
            None
        };

        if let Some(reason) = reason {
            debug!(line = index + 1, ?reason, "speaker-like line kept as text");
            self.ambiguities.push(ParseAmbiguity {
                line: index + 1,
                text: line.to_string(),
                reason,
            });
            return None;
        }
        Some((name.to_uppercase(), rest))
    }

    fn emit(&mut self, pending: Pending<'a>) -> Option<Turn> {
        let body = pending.body.join("\n");
        let body = body.trim();
        if body.is_empty() {
            return None;
        }
        let turn = Turn::new(pending.speaker, self.next_position, body);
        self.next_position += 1;
        Some(turn)
    }
}

impl Iterator for Turns<'_> {
    type Item = Turn;

    fn next(&mut self) -> Option<Turn> {
        while let Some((index, line)) = self.lines.next() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            match self.boundary(index, line) {
                Some((speaker, rest)) => {
                    let done = self.pending.replace(Pending {
                        speaker,
                        body: vec![rest],
                    });
                    if let Some(turn) = done.and_then(|p| self.emit(p)) {
                        return Some(turn);
                    }
                }
                None => {
                    if let Some(pending) = self.pending.as_mut() {
                        pending.body.push(line);
                    }
                }
            }
        }
        let last = self.pending.take()?;
        self.emit(last)
    }
}

impl FusedIterator for Turns<'_> {}
