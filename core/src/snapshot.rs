//! Snapshot serialization.
//!
//! Two shapes live here:
//!   - RosterSnapshot: the persisted roster blob, a JSON array of
//!     `{initials, branch, position}`.
//!   - DashboardSnapshot: the full view state handed to the presentation
//!     layer after every command.

use crate::{
    aggregation::AggregateResult,
    error::DashResult,
    report::{BreakdownRow, SummaryCard},
    roster::{Agent, Roster},
    store::RosterOrigin,
    types::AgentId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterSnapshot {
    pub agents: Vec<Agent>,
}

impl RosterSnapshot {
    pub fn from_roster(roster: &Roster) -> Self {
        Self { agents: roster.agents().to_vec() }
    }

    /// Rebuilds the roster invariants (normalized ids, unique, sorted)
    /// in case the blob was edited by hand.
    pub fn into_roster(self) -> Roster {
        Roster::from_agents(self.agents)
    }

    pub fn encode(&self) -> DashResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> DashResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub roster:        Vec<Agent>,
    pub roster_origin: RosterOrigin,
    pub sales_loaded:  usize,
    pub matched_count: usize,
    pub skipped:       Vec<AgentId>,
    /// Calculate is only offered when something matched.
    pub can_calculate: bool,
    pub result:        Option<AggregateResult>,
    pub cards:         Vec<SummaryCard>,
    pub breakdown:     Vec<BreakdownRow>,
}
