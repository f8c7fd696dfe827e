//! Records produced by the parser and the coordination analyzer

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

use condense_core::Method;

use crate::parser::extract_timestamp;

/// One parsed unit of a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Uppercased speaker name
    pub speaker: String,
    /// 0-based, contiguous across emitted turns
    pub position: usize,
    /// Body with surrounding whitespace trimmed
    pub raw_text: String,
    /// First timestamp written in the body, verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Turn {
    /// Build a turn, picking up any timestamp written in the body
    pub fn new(speaker: impl Into<String>, position: usize, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        Self {
            speaker: speaker.into(),
            position,
            timestamp: extract_timestamp(&raw_text),
            raw_text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityReason {
    /// `NAME://` reads like a URL scheme, not a speaker
    UrlScheme,
    /// Speaker-like line inside a ``` fence
    InsideCodeFence,
}

/// A line that looked like a turn boundary but was kept as body text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseAmbiguity {
    /// 1-based line number in the transcript
    pub line: usize,
    pub text: String,
    pub reason: AmbiguityReason,
}

/// Directed `@` reference from one speaker to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionEdge {
    pub from: String,
    pub to: String,
    pub position: usize,
    /// Up to 50 chars either side of the marker
    pub context: String,
    /// Target spoke after this mention and before the next one aimed at them.
    /// Temporal proximity only; the reply's topic is not checked.
    pub acknowledged: bool,
}

/// Every mention edge, in transcript order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionGraph {
    edges: Vec<MentionEdge>,
}

impl MentionGraph {
    pub fn new(edges: Vec<MentionEdge>) -> Self {
        Self { edges }
    }

    pub fn edges(&self) -> &[MentionEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of edges from `from` to `to`
    pub fn count(&self, from: &str, to: &str) -> usize {
        self.edges
            .iter()
            .filter(|e| e.from == from && e.to == to)
            .count()
    }

    /// Edges targeting `to`, ordered by position
    pub fn received(&self, to: &str) -> Vec<&MentionEdge> {
        self.edges.iter().filter(|e| e.to == to).collect()
    }

    /// `{from: {to: count}}`
    pub fn adjacency(&self) -> BTreeMap<String, BTreeMap<String, usize>> {
        let mut adjacency: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for edge in &self.edges {
            *adjacency
                .entry(edge.from.clone())
                .or_default()
                .entry(edge.to.clone())
                .or_insert(0) += 1;
        }
        adjacency
    }
}

impl Serialize for MentionGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.adjacency().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: String,
    pub topic: String,
    pub choice: String,
    pub position: usize,
    pub raw_text: String,
    /// A later vote by the same voter on the same topic replaced this one
    pub superseded: bool,
}

/// topic -> choice -> distinct voters
pub type VoteTally = BTreeMap<String, BTreeMap<String, usize>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    MentionDenial,
    VoteCount,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::MentionDenial => "mention_denial",
            ClaimType::VoteCount => "vote_count",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub speaker: String,
    pub claim_text: String,
    pub position: usize,
    pub claim_type: ClaimType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asserted_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asserted_choice: Option<String>,
    /// `None` until checked
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// A fact backing a contradiction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    Mention {
        from: String,
        to: String,
        position: usize,
    },
    Vote {
        voter: String,
        topic: String,
        choice: String,
        position: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contradiction {
    pub claim_id: String,
    pub contradiction_type: ClaimType,
    pub severity: Severity,
    pub fact_description: String,
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEvent {
    Mention { to: String },
    Vote { topic: String, choice: String },
    Claim { claim_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub position: usize,
    pub speaker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub summary: String,
    pub events: Vec<TimelineEvent>,
    /// The turn carries a mention, vote or claim
    pub coordination: bool,
}

/// Everything the transcript says about one participant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentContext {
    pub agent: String,
    pub participation_count: usize,
    pub first_turn: Option<usize>,
    pub last_turn: Option<usize>,
    pub mentions_received: Vec<MentionEdge>,
    pub mentions_made: Vec<MentionEdge>,
    pub mentions_acknowledged: Vec<MentionEdge>,
    pub votes_cast: Vec<Vote>,
    pub claims_made: Vec<String>,
    pub pending_actions: Vec<String>,
}

/// Output of a group conversation compression. Field names are part of the
/// JSON surface.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationCompressionResult {
    pub original_size: usize,
    pub compressed_size: usize,
    pub compression_ratio: f64,
    pub estimated_token_savings: i64,
    pub preview: Option<String>,
    /// Always `summary`: the digest is a structural summary of the transcript
    pub method: Method,
    pub total_messages: usize,
    pub unique_agents: usize,
    pub mention_graph: MentionGraph,
    pub votes: VoteTally,
    pub vote_details: Vec<Vote>,
    pub claims: BTreeMap<String, Claim>,
    pub contradictions: Vec<Contradiction>,
    pub timeline: Vec<TimelineEntry>,
    pub agent_contexts: BTreeMap<String, AgentContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<AgentContext>,
    pub parse_ambiguities: Vec<ParseAmbiguity>,
    pub compressed_text: String,
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str, position: usize) -> MentionEdge {
        MentionEdge {
            from: from.to_string(),
            to: to.to_string(),
            position,
            context: String::new(),
            acknowledged: false,
        }
    }

    #[test]
    fn test_graph_counts_and_received() {
        let graph = MentionGraph::new(vec![edge("B", "A", 1), edge("C", "A", 2), edge("B", "A", 3)]);
        assert_eq!(graph.count("B", "A"), 2);
        assert_eq!(graph.count("A", "B"), 0);
        let positions: Vec<usize> = graph.received("A").iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn test_graph_serializes_as_adjacency() {
        let graph = MentionGraph::new(vec![edge("B", "A", 1), edge("B", "A", 2), edge("B", "C", 2)]);
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json, serde_json::json!({"B": {"A": 2, "C": 1}}));
    }

    #[test]
    fn test_evidence_is_tagged() {
        let evidence = Evidence::Mention {
            from: "B".to_string(),
            to: "A".to_string(),
            position: 0,
        };
        let json = serde_json::to_value(&evidence).unwrap();
        assert_eq!(json["kind"], "mention");
        assert_eq!(json["to"], "A");
    }

    #[test]
    fn test_turn_new_reads_timestamp() {
        let turn = Turn::new("A", 0, "[2025-03-01 14:05] deploy done");
        assert_eq!(turn.timestamp.as_deref(), Some("2025-03-01 14:05"));
        assert_eq!(Turn::new("A", 1, "no time here").timestamp, None);
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::High > Severity::Medium);
        assert_eq!(
            serde_json::to_string(&Severity::Medium).unwrap(),
            "\"medium\""
        );
    }
}
