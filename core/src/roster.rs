//! Agent roster: the only durable state in the dashboard.
//!
//! RULES:
//!   - No two agents share an id (ids are compared after normalize_id).
//!   - Agents are always kept sorted by id.
//!   - Every operation returns a new Roster; the receiver is never mutated.

use crate::{
    error::{DashResult, DashboardError},
    types::{normalize_id, AgentId, Branch, Position},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(rename = "initials")]
    pub id:       AgentId,
    pub branch:   Branch,
    pub position: Position,
}

impl Agent {
    /// Build an agent, normalizing the id. Rejects blank ids.
    pub fn new(id: &str, branch: Branch, position: Position) -> DashResult<Self> {
        let id = normalize_id(id);
        if id.is_empty() {
            return Err(DashboardError::EmptyIdentifier);
        }
        Ok(Self { id, branch, position })
    }

    /// Build an agent from the free-text fields of an add-agent form.
    /// Fields are checked in form order: id, branch, position. Codes are
    /// upper-cased first, as filter codes are; import files stay strict.
    pub fn parse(id: &str, branch: &str, position: &str) -> DashResult<Self> {
        if id.trim().is_empty() {
            return Err(DashboardError::EmptyIdentifier);
        }
        let branch: Branch = branch.trim().to_uppercase().parse()?;
        let position: Position = position.trim().to_uppercase().parse()?;
        Self::new(id, branch, position)
    }
}

/// One entry of an imported roster file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAgentRecord {
    pub initials: Option<String>,
    pub branch:   Option<String>,
    pub position: Option<String>,
}

impl RawAgentRecord {
    pub fn new(initials: &str, branch: &str, position: &str) -> Self {
        Self {
            initials: Some(initials.to_string()),
            branch:   Some(branch.to_string()),
            position: Some(position.to_string()),
        }
    }

    fn from_value(value: &serde_json::Value) -> Self {
        let field = |name: &str| value.get(name).and_then(|v| v.as_str()).map(str::to_string);
        Self {
            initials: field("initials"),
            branch:   field("branch"),
            position: field("position"),
        }
    }

    /// Returns the agent this record describes, or None if any field is
    /// missing or outside the valid enum set.
    fn validate(&self) -> Option<Agent> {
        let branch = self.branch.as_deref()?.parse().ok()?;
        let position = self.position.as_deref()?.parse().ok()?;
        Agent::new(self.initials.as_deref()?, branch, position).ok()
    }
}

/// Parse the text of a roster import file.
///
/// The document must be a JSON array; anything else is `InvalidFormat`.
/// Elements that are not objects are kept as empty records and get
/// dropped during `import_merge`.
pub fn parse_roster_import(text: &str) -> DashResult<Vec<RawAgentRecord>> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| DashboardError::invalid_format(format!("not valid JSON: {e}")))?;
    let items = value
        .as_array()
        .ok_or_else(|| DashboardError::invalid_format("expected an array of agents"))?;
    Ok(items.iter().map(RawAgentRecord::from_value).collect())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    agents: Vec<Agent>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from arbitrary agents: ids are normalized, later
    /// duplicates are dropped, and the result is sorted.
    pub fn from_agents(agents: impl IntoIterator<Item = Agent>) -> Self {
        let mut roster = Self::new();
        for mut agent in agents {
            agent.id = normalize_id(&agent.id);
            if !agent.id.is_empty() && !roster.contains(&agent.id) {
                roster.agents.push(agent);
            }
        }
        roster.sort();
        roster
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Exact lookup; `id` is expected to be normalized already.
    pub fn find(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(&normalize_id(id)).is_some()
    }

    pub fn add(&self, candidate: Agent) -> DashResult<Roster> {
        let id = normalize_id(&candidate.id);
        if id.is_empty() {
            return Err(DashboardError::EmptyIdentifier);
        }
        if self.contains(&id) {
            return Err(DashboardError::DuplicateIdentifier { id });
        }
        let mut next = self.clone();
        next.agents.push(Agent { id, ..candidate });
        next.sort();
        Ok(next)
    }

    /// Removing an absent id is a no-op.
    pub fn remove(&self, id: &str) -> Roster {
        let id = normalize_id(id);
        let mut next = self.clone();
        next.agents.retain(|a| a.id != id);
        next
    }

    /// Merge valid candidates that are not already present.
    /// Returns the new roster and how many agents were added.
    pub fn import_merge(&self, candidates: &[RawAgentRecord]) -> (Roster, usize) {
        let mut next = self.clone();
        let mut added = 0;
        for agent in candidates.iter().filter_map(RawAgentRecord::validate) {
            if next.contains(&agent.id) {
                continue;
            }
            next.agents.push(agent);
            added += 1;
        }
        next.sort();
        (next, added)
    }

    /// Pretty-printed JSON array of `{initials, branch, position}`.
    pub fn to_export_json(&self) -> DashResult<String> {
        if self.is_empty() {
            return Err(DashboardError::EmptyRoster);
        }
        Ok(serde_json::to_string_pretty(&self.agents)?)
    }

    fn sort(&mut self) {
        self.agents.sort_by(|a, b| a.id.cmp(&b.id));
    }
}

/// Built-in roster used on first start or when the stored copy is unusable.
pub fn default_roster() -> Roster {
    use Branch::*;
    use Position::*;

    const SEED: &[(&str, Branch, Position)] = &[
        ("AZN", Tij, Closer), ("DXL", Tij, Closer), ("HXR", Tij, Closer),
        ("JXM", Tij, Dialer), ("JXR", Tij, Closer), ("JXT", Tij, Dialer),
        ("NXS", Tij, Closer), ("WXA", Tij, Dialer),
        ("FFS", Rsa, Dialer), ("JGF", Rsa, Closer), ("MEM", Rsa, Dialer),
        ("MRV", Rsa, Dialer), ("OEL", Rsa, Dialer), ("SCG", Rsa, Dialer),
        ("SVJ", Rsa, Closer),
        ("AXE", Ovs, Dialer), ("AXM", Ovs, Dialer), ("AXY", Ovs, Dialer),
        ("EXM", Ovs, Dialer), ("GXC", Ovs, Dialer), ("HXS", Ovs, Dialer),
        ("JAU", Ovs, Dialer), ("JQM", Ovs, Dialer), ("JYF", Ovs, Dialer),
        ("MXG", Ovs, Dialer), ("PGA", Ovs, Dialer), ("RBD", Ovs, Dialer),
        ("RJB", Ovs, Dialer), ("RTM", Ovs, Dialer), ("RXM", Ovs, Dialer),
        ("RXY", Ovs, Dialer), ("SJC", Ovs, Dialer), ("WJC", Ovs, Dialer),
        ("YXY", Ovs, Dialer),
    ];

    Roster::from_agents(SEED.iter().map(|&(id, branch, position)| Agent {
        id: id.to_string(),
        branch,
        position,
    }))
}
