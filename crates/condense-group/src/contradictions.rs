//! Claim verification against the history before each claim

use serde::{Deserialize, Serialize};

use crate::types::{Claim, ClaimType, Contradiction, Evidence, MentionGraph, Severity, Vote};
use crate::votes::counted_before;

/// Severity assigned to each contradiction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityPolicy {
    pub mention_denial: Severity,
    pub vote_count: Severity,
}

impl SeverityPolicy {
    /// Denying a mention is `high`, a miscount `medium`
    pub fn new() -> Self {
        Self {
            mention_denial: Severity::High,
            vote_count: Severity::Medium,
        }
    }

    pub fn severity(&self, claim_type: ClaimType) -> Severity {
        match claim_type {
            ClaimType::MentionDenial => self.mention_denial,
            ClaimType::VoteCount => self.vote_count,
        }
    }
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self::new()
    }
}

fn check_mention_denial(claim: &Claim, graph: &MentionGraph) -> Option<(String, Vec<Evidence>)> {
    let evidence: Vec<Evidence> = graph
        .received(&claim.speaker)
        .into_iter()
        .filter(|e| e.position < claim.position)
        .map(|e| Evidence::Mention {
            from: e.from.clone(),
            to: e.to.clone(),
            position: e.position,
        })
        .collect();
    if evidence.is_empty() {
        return None;
    }
    let fact = format!(
        "{} was mentioned {} time(s) before this claim",
        claim.speaker,
        evidence.len()
    );
    Some((fact, evidence))
}

fn check_vote_count(claim: &Claim, votes: &[Vote]) -> Option<(String, Vec<Evidence>)> {
    let asserted = claim.asserted_count?;
    let counted: Vec<&Vote> = counted_before(votes, claim.position)
        .into_iter()
        .filter(|v| {
            claim
                .asserted_choice
                .as_ref()
                .is_none_or(|choice| &v.choice == choice)
        })
        .collect();
    if counted.len() == asserted {
        return None;
    }

    let scope = match &claim.asserted_choice {
        Some(choice) => format!(" for {}", choice),
        None => String::new(),
    };
    let fact = format!(
        "{} vote(s){} cast before this claim, claimed {}",
        counted.len(),
        scope,
        asserted
    );
    let evidence = counted
        .into_iter()
        .map(|v| Evidence::Vote {
            voter: v.voter.clone(),
            topic: v.topic.clone(),
            choice: v.choice.clone(),
            position: v.position,
        })
        .collect();
    Some((fact, evidence))
}

/// Check every claim and record `verified` on it.
///
/// Only mentions and votes strictly before the claim's position are
/// considered, so a later event never contradicts an earlier claim.
pub fn detect_contradictions(
    claims: &mut [Claim],
    graph: &MentionGraph,
    votes: &[Vote],
    policy: &SeverityPolicy,
) -> Vec<Contradiction> {
    let mut contradictions = Vec::new();
    for claim in claims.iter_mut() {
        let found = match claim.claim_type {
            ClaimType::MentionDenial => check_mention_denial(claim, graph),
            ClaimType::VoteCount => check_vote_count(claim, votes),
        };
        claim.verified = Some(found.is_none());
        if let Some((fact_description, evidence)) = found {
            contradictions.push(Contradiction {
                claim_id: claim.claim_id.clone(),
                contradiction_type: claim.claim_type,
                severity: policy.severity(claim.claim_type),
                fact_description,
                evidence,
            });
        }
    }
    contradictions
}
