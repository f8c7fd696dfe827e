//! Per-participant views over a finished analysis

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{AgentContext, Claim, Contradiction, MentionGraph, Turn, Vote};

/// Speakers plus everyone mentioned
pub fn participants(turns: &[Turn], graph: &MentionGraph) -> BTreeSet<String> {
    turns
        .iter()
        .map(|t| t.speaker.clone())
        .chain(graph.edges().iter().map(|e| e.to.clone()))
        .collect()
}

pub fn agent_context(
    agent: &str,
    turns: &[Turn],
    graph: &MentionGraph,
    votes: &[Vote],
    claims: &[Claim],
    contradictions: &[Contradiction],
) -> AgentContext {
    let authored: Vec<usize> = turns
        .iter()
        .filter(|t| t.speaker == agent)
        .map(|t| t.position)
        .collect();
    let mentions_received: Vec<_> = graph.received(agent).into_iter().cloned().collect();
    let mentions_acknowledged: Vec<_> = mentions_received
        .iter()
        .filter(|e| e.acknowledged)
        .cloned()
        .collect();
    let made: Vec<&Claim> = claims.iter().filter(|c| c.speaker == agent).collect();

    let mut pending_actions: Vec<String> = mentions_received
        .iter()
        .filter(|e| !e.acknowledged)
        .map(|e| format!("reply to {} (mentioned at msg#{})", e.from, e.position))
        .collect();
    for claim in &made {
        if let Some(c) = contradictions.iter().find(|c| c.claim_id == claim.claim_id) {
            pending_actions.push(format!(
                "revisit claim {}: {}",
                claim.claim_id, c.fact_description
            ));
        }
    }

    AgentContext {
        agent: agent.to_string(),
        participation_count: authored.len(),
        first_turn: authored.first().copied(),
        last_turn: authored.last().copied(),
        mentions_made: graph
            .edges()
            .iter()
            .filter(|e| e.from == agent)
            .cloned()
            .collect(),
        mentions_received,
        mentions_acknowledged,
        votes_cast: votes.iter().filter(|v| v.voter == agent).cloned().collect(),
        claims_made: made.iter().map(|c| c.claim_id.clone()).collect(),
        pending_actions,
    }
}

/// Contexts for every participant, keyed by name
pub fn agent_contexts(
    turns: &[Turn],
    graph: &MentionGraph,
    votes: &[Vote],
    claims: &[Claim],
    contradictions: &[Contradiction],
) -> BTreeMap<String, AgentContext> {
    participants(turns, graph)
        .into_iter()
        .map(|agent| {
            let context = agent_context(&agent, turns, graph, votes, claims, contradictions);
            (agent, context)
        })
        .collect()
}
