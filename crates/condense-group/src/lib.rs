//! Multi-agent conversation analysis: mentions, votes, claims and
//! contradictions, condensed into a digest

mod analyzer;
mod claims;
mod context;
mod contradictions;
mod mentions;
mod parser;
mod render;
mod timeline;
mod types;
mod votes;

pub use analyzer::{compress_group_conversation, Analyzer, AnalyzerConfig};
pub use claims::extract_claims;
pub use context::{agent_context, agent_contexts, participants};
pub use contradictions::{detect_contradictions, SeverityPolicy};
pub use mentions::{extract_mentions, known_agents, mark_acknowledged, mentions_in};
pub use parser::{extract_timestamp, parse, Parsed, Turns};
pub use timeline::{build_timeline, first_sentence};
pub use types::{
    AgentContext, AmbiguityReason, Claim, ClaimType, Contradiction, ConversationCompressionResult,
    Evidence, MentionEdge, MentionGraph, ParseAmbiguity, Severity, TimelineEntry, TimelineEvent,
    Turn, Vote, VoteTally,
};
pub use votes::{collect_votes, counted_before, extract_vote, tally, DEFAULT_TOPIC};
