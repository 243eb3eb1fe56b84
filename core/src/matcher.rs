//! Join sales records against the roster.
//!
//! Every input record lands in exactly one of `matched` or `skipped`,
//! in input order.

use crate::{
    extractor::SalesRecord,
    roster::{Agent, Roster},
    types::{AgentId, Branch, Position},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedAgentRecord {
    pub id:       AgentId,
    pub branch:   Branch,
    pub position: Position,
    pub amount:   f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub matched: Vec<MatchedAgentRecord>,
    pub skipped: Vec<AgentId>,
}

impl MatchOutcome {
    pub fn total(&self) -> usize {
        self.matched.len() + self.skipped.len()
    }
}

/// Exact, case-sensitive lookup; both sides are normalized upstream.
pub fn match_records(records: &[SalesRecord], roster: &Roster) -> MatchOutcome {
    let index: HashMap<&str, &Agent> = roster
        .agents()
        .iter()
        .map(|a| (a.id.as_str(), a))
        .collect();

    let mut outcome = MatchOutcome::default();
    for record in records {
        match index.get(record.agent_id.as_str()) {
            Some(agent) => outcome.matched.push(MatchedAgentRecord {
                id:       record.agent_id.clone(),
                branch:   agent.branch,
                position: agent.position,
                amount:   record.amount,
            }),
            None => outcome.skipped.push(record.agent_id.clone()),
        }
    }

    log::debug!(
        "Matched {} of {} sales records ({} skipped)",
        outcome.matched.len(),
        records.len(),
        outcome.skipped.len()
    );
    outcome
}
