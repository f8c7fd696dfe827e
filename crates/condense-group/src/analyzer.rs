//! Coordination analysis: parser output in, conversation result out

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use condense_core::{preview, CompressError, CompressionResult, Config, Method};
use condense_telemetry::Stats;

use crate::claims::extract_claims;
use crate::context::{agent_contexts, participants};
use crate::contradictions::{detect_contradictions, SeverityPolicy};
use crate::mentions::{mark_acknowledged, mentions_in};
use crate::parser::parse;
use crate::render::Digest;
use crate::timeline::build_timeline;
use crate::types::{
    AgentContext, ConversationCompressionResult, MentionGraph, ParseAmbiguity, Turn,
};
use crate::votes::{collect_votes, tally};

/// Heuristic knobs for conversation analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Max characters of a timeline summary
    pub summary_chars: usize,

    /// Key events listed in the digest
    pub digest_events: usize,

    pub severity: SeverityPolicy,

    /// Known agent names. When empty, agents are detected from speakers and
    /// uppercase `@NAME` markers.
    pub agents: Vec<String>,
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self {
            summary_chars: 80,
            digest_events: 20,
            severity: SeverityPolicy::new(),
            agents: Vec::new(),
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_agent(name: &str) -> Option<String> {
    let name = name.trim().trim_start_matches('@').to_uppercase();
    (!name.is_empty()).then_some(name)
}

pub struct Analyzer {
    config: Config,
    analysis: AnalyzerConfig,
    stats: Arc<Stats>,
}

impl Analyzer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            analysis: AnalyzerConfig::new(),
            stats: Stats::global(),
        }
    }

    pub fn with_analysis(mut self, analysis: AnalyzerConfig) -> Self {
        self.analysis = analysis;
        self
    }

    /// Restrict mention targets to `agents`; an empty list restores detection
    pub fn with_agents(mut self, agents: Vec<String>) -> Self {
        self.analysis.agents = agents;
        self
    }

    pub fn with_stats(mut self, stats: Arc<Stats>) -> Self {
        self.stats = stats;
        self
    }

    /// Parse and analyze a raw transcript.
    ///
    /// Results are not cached; every call counts as one compression.
    pub fn compress(
        &self,
        raw: &str,
        focus: Option<&str>,
    ) -> Result<ConversationCompressionResult, CompressError> {
        let size = raw.chars().count();
        if size > self.config.max_text_chars {
            return Err(CompressError::InputTooLarge {
                size: size as u64,
                limit: self.config.max_text_chars as u64,
            });
        }

        let parsed = parse(raw).finish();
        debug!(
            turns = parsed.turns.len(),
            ambiguities = parsed.ambiguities.len(),
            "parsed transcript"
        );
        let result = self.build(size, &parsed.turns, parsed.ambiguities, focus);

        self.stats.record_compression(
            self.config.estimate_tokens(raw),
            self.config.estimate_tokens(&result.compressed_text),
        );
        Ok(result)
    }

    /// Analyze already-parsed turns. `original_size` is the total length of
    /// the turn bodies.
    pub fn analyze(&self, turns: &[Turn], focus: Option<&str>) -> ConversationCompressionResult {
        let size = turns.iter().map(|t| t.raw_text.chars().count()).sum();
        self.build(size, turns, Vec::new(), focus)
    }

    fn build(
        &self,
        original_size: usize,
        turns: &[Turn],
        parse_ambiguities: Vec<ParseAmbiguity>,
        focus: Option<&str>,
    ) -> ConversationCompressionResult {
        let mut edges = mentions_in(turns, &self.analysis.agents);
        mark_acknowledged(&mut edges, turns);
        let graph = MentionGraph::new(edges);

        let vote_details = collect_votes(turns);
        let votes = tally(&vote_details);

        let mut claims = extract_claims(turns);
        let contradictions =
            detect_contradictions(&mut claims, &graph, &vote_details, &self.analysis.severity);

        let timeline = build_timeline(
            turns,
            &graph,
            &vote_details,
            &claims,
            self.analysis.summary_chars,
        );
        let agent_contexts = agent_contexts(turns, &graph, &vote_details, &claims, &contradictions);
        let unique_agents = participants(turns, &graph).len();

        let focus = focus.and_then(normalize_agent).map(|agent| {
            agent_contexts
                .get(&agent)
                .cloned()
                .unwrap_or_else(|| AgentContext {
                    agent,
                    ..AgentContext::default()
                })
        });

        let digest = Digest {
            turns,
            graph: &graph,
            tally: &votes,
            claims: &claims,
            contradictions: &contradictions,
            timeline: &timeline,
            focus: focus.as_ref(),
            unique_agents,
            max_events: self.analysis.digest_events,
        };
        let compressed_text = digest.render();
        let summary = digest.summary();

        let measured = CompressionResult::from_parts(
            original_size,
            compressed_text.chars().count(),
            Method::Summary,
            self.config.chars_per_token,
            preview(&compressed_text, self.config.preview_chars),
        );
        debug!(
            messages = turns.len(),
            mentions = graph.len(),
            contradictions = contradictions.len(),
            "analyzed conversation"
        );

        ConversationCompressionResult {
            original_size,
            compressed_size: measured.compressed_size(),
            compression_ratio: measured.compression_ratio(),
            estimated_token_savings: measured.estimated_token_savings(),
            preview: measured.preview().map(str::to_string),
            method: measured.method(),
            total_messages: turns.len(),
            unique_agents,
            mention_graph: graph,
            votes,
            vote_details,
            claims: claims
                .into_iter()
                .map(|c| (c.claim_id.clone(), c))
                .collect(),
            contradictions,
            timeline,
            agent_contexts,
            focus,
            parse_ambiguities,
            compressed_text,
            summary,
        }
    }
}

/// Compress a group transcript with default settings
pub fn compress_group_conversation(
    raw: &str,
    focus: Option<&str>,
) -> Result<ConversationCompressionResult, CompressError> {
    Analyzer::new(Config::new()).compress(raw, focus)
}
