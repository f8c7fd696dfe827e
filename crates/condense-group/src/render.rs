//! Plain-text digest and one-paragraph summary

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::types::{
    AgentContext, Claim, Contradiction, Evidence, MentionGraph, TimelineEntry, Turn, VoteTally,
};

const RULE: usize = 60;
const SUBRULE: usize = 40;
const FOCUS_CONTEXT_CHARS: usize = 60;

pub(crate) struct Digest<'a> {
    pub turns: &'a [Turn],
    pub graph: &'a MentionGraph,
    pub tally: &'a VoteTally,
    pub claims: &'a [Claim],
    pub contradictions: &'a [Contradiction],
    pub timeline: &'a [TimelineEntry],
    pub focus: Option<&'a AgentContext>,
    pub unique_agents: usize,
    pub max_events: usize,
}

fn section(out: &mut String, title: &str) {
    let rule = "-".repeat(SUBRULE);
    let _ = writeln!(out, "{}\n{}\n{}", rule, title, rule);
}

fn describe(evidence: &Evidence) -> String {
    match evidence {
        Evidence::Mention { from, to, position } => {
            format!("@{} by {} at msg#{}", to, from, position)
        }
        Evidence::Vote {
            voter,
            choice,
            position,
            ..
        } => format!("{} voted {} at msg#{}", voter, choice, position),
    }
}

impl Digest<'_> {
    /// Sectioned report: statistics, mentions, votes, contradictions, key
    /// events, then the focus agent when one was requested
    pub fn render(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(RULE);
        let _ = writeln!(out, "{}\nGROUP CONVERSATION DIGEST\n{}\n", rule, rule);

        let mut speakers: Vec<&str> = self.turns.iter().map(|t| t.speaker.as_str()).collect();
        speakers.sort_unstable();
        speakers.dedup();
        let verified = self.claims.iter().filter(|c| c.verified == Some(true)).count();
        let _ = writeln!(out, "Total Messages: {}", self.turns.len());
        let _ = writeln!(out, "Participants: {}", speakers.join(", "));
        let _ = writeln!(out, "Mentions: {}", self.graph.len());
        let _ = writeln!(out, "Claims: {} ({} verified)", self.claims.len(), verified);
        let _ = writeln!(out, "Contradictions: {}\n", self.contradictions.len());

        self.render_mentions(&mut out);
        self.render_votes(&mut out);
        self.render_contradictions(&mut out);
        self.render_events(&mut out);
        if let Some(focus) = self.focus {
            render_focus(&mut out, focus);
        }

        let _ = write!(out, "{}\nEND DIGEST\n{}", rule, rule);
        out
    }

    fn render_mentions(&self, out: &mut String) {
        section(out, "MENTION GRAPH");
        let mut received: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for edge in self.graph.edges() {
            let entry = received.entry(edge.to.as_str()).or_default();
            entry.0 += 1;
            if edge.acknowledged {
                entry.1 += 1;
            }
        }
        let mut rows: Vec<_> = received.into_iter().collect();
        rows.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.0.cmp(b.0)));
        for (agent, (count, acked)) in rows {
            let _ = writeln!(
                out,
                "  @{}: {} mention(s) (ack: {}/{})",
                agent, count, acked, count
            );
        }
        out.push('\n');
    }

    fn render_votes(&self, out: &mut String) {
        if self.tally.is_empty() {
            return;
        }
        section(out, "VOTE TALLIES");
        for (topic, choices) in self.tally {
            let _ = writeln!(out, "  {}:", topic);
            let mut rows: Vec<_> = choices.iter().collect();
            rows.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            for (choice, count) in rows {
                let _ = writeln!(out, "    {}: {} vote(s)", choice, count);
            }
        }
        out.push('\n');
    }

    fn render_contradictions(&self, out: &mut String) {
        if self.contradictions.is_empty() {
            return;
        }
        section(out, "[!] CONTRADICTIONS");
        for c in self.contradictions {
            let _ = writeln!(
                out,
                "  [{}] {} ({}):",
                c.severity.as_str().to_uppercase(),
                c.contradiction_type.as_str(),
                c.claim_id
            );
            if let Some(claim) = self.claims.iter().find(|cl| cl.claim_id == c.claim_id) {
                let _ = writeln!(out, "    Claim: {}: \"{}\"", claim.speaker, claim.claim_text);
            }
            let _ = writeln!(out, "    Fact: {}", c.fact_description);
            if !c.evidence.is_empty() {
                let items: Vec<String> = c.evidence.iter().map(describe).collect();
                let _ = writeln!(out, "    Evidence: {}", items.join("; "));
            }
        }
        out.push('\n');
    }

    fn render_events(&self, out: &mut String) {
        section(out, "KEY EVENTS");
        let key: Vec<&TimelineEntry> = self.timeline.iter().filter(|e| e.coordination).collect();
        for entry in key.iter().take(self.max_events) {
            let at = match &entry.timestamp {
                Some(ts) => ts.clone(),
                None => format!("msg#{}", entry.position),
            };
            let _ = writeln!(out, "  [{}] {}: {}", at, entry.speaker, entry.summary);
        }
        if key.len() > self.max_events {
            let _ = writeln!(out, "  ... and {} more events", key.len() - self.max_events);
        }
        out.push('\n');
    }

    /// One paragraph; with a focus agent it opens with their unanswered mentions
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        if let Some(focus) = self.focus {
            let unacked: Vec<String> = focus
                .mentions_received
                .iter()
                .filter(|e| !e.acknowledged)
                .map(|e| format!("{} at msg#{}", e.from, e.position))
                .collect();
            if unacked.is_empty() {
                let _ = write!(summary, "{} has no unacknowledged mentions. ", focus.agent);
            } else {
                let _ = write!(
                    summary,
                    "{} has {} unacknowledged mention(s) (from {}). ",
                    focus.agent,
                    unacked.len(),
                    unacked.join(", ")
                );
            }
        }
        let _ = write!(
            summary,
            "Group conversation with {} agents, {} messages. {} mentions, {} contradictions detected.",
            self.unique_agents,
            self.turns.len(),
            self.graph.len(),
            self.contradictions.len()
        );
        summary
    }
}

/// `text` on one line, cut at `max_chars` with `...` appended
fn clip(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

fn render_focus(out: &mut String, focus: &AgentContext) {
    section(out, &format!("FOCUS: {}", focus.agent));
    let unacked: Vec<_> = focus
        .mentions_received
        .iter()
        .filter(|e| !e.acknowledged)
        .collect();
    let _ = writeln!(out, "  Received {} mention(s)", focus.mentions_received.len());
    if !unacked.is_empty() {
        let _ = writeln!(out, "  [!] {} UNACKNOWLEDGED:", unacked.len());
        for edge in unacked.iter().take(5) {
            let _ = writeln!(
                out,
                "      From {} at msg#{}: \"{}\"",
                edge.from,
                edge.position,
                clip(&edge.context, FOCUS_CONTEXT_CHARS)
            );
        }
    }
    if !focus.pending_actions.is_empty() {
        let _ = writeln!(out, "  Pending:");
        for action in &focus.pending_actions {
            let _ = writeln!(out, "      - {}", action);
        }
    }
    out.push('\n');
}
