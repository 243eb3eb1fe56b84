//! Dashboard events surfaced in the notification area.
//!
//! RULE: The session never talks to the UI directly. It records events;
//! the presentation layer drains them and renders each as a toast.

use crate::{error::DashboardError, store::RosterOrigin, types::AgentId};
use serde::{Deserialize, Serialize};

/// Every user-visible notification.
/// Variants are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    // ── Roster ─────────────────────────────────────
    RosterLoaded {
        count:  usize,
        origin: String,
    },
    AgentAdded {
        id: AgentId,
    },
    AgentRemoved {
        id: AgentId,
    },
    RosterImported {
        added: usize,
    },
    RosterExported {
        count: usize,
    },

    // ── Sales data ─────────────────────────────────
    SalesLoaded {
        file_name: String,
        records:   usize,
        matched:   usize,
        skipped:   usize,
    },
    StaleUploadDiscarded {
        file_name:  String,
        generation: u64,
    },

    // ── Results ────────────────────────────────────
    AveragesCalculated {
        agents:          usize,
        overall_average: f64,
    },
    ResultsExported {
        /// Agent rows in the breakdown section.
        agents: usize,
    },

    // ── Failures ───────────────────────────────────
    ErrorRaised {
        kind:    String,
        message: String,
    },
}

impl DashboardEvent {
    pub fn error(err: &DashboardError) -> Self {
        DashboardEvent::ErrorRaised {
            kind:    err.kind().to_string(),
            message: err.to_string(),
        }
    }

    pub fn roster_loaded(count: usize, origin: RosterOrigin) -> Self {
        let origin = match origin {
            RosterOrigin::Stored  => "stored",
            RosterOrigin::Default => "default",
        };
        DashboardEvent::RosterLoaded { count, origin: origin.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DashboardEvent::ErrorRaised { .. })
    }

    /// Toast text.
    pub fn message(&self) -> String {
        match self {
            DashboardEvent::RosterLoaded { count, origin } => {
                format!("Loaded {} ({origin} roster)", agents(*count))
            }
            DashboardEvent::AgentAdded { id }   => format!("Agent {id} added to roster"),
            DashboardEvent::AgentRemoved { id } => format!("Agent {id} removed"),
            DashboardEvent::RosterImported { added } => {
                format!("Imported {added} new agent{}", plural(*added))
            }
            DashboardEvent::RosterExported { .. } => "Roster exported successfully".into(),
            DashboardEvent::SalesLoaded { .. }    => "CRM report loaded successfully".into(),
            DashboardEvent::StaleUploadDiscarded { file_name, .. } => {
                format!("Ignored superseded upload {file_name}")
            }
            DashboardEvent::AveragesCalculated { agents: n, .. } => {
                format!("Averages calculated for {}", agents(*n))
            }
            DashboardEvent::ResultsExported { .. } => "Results exported successfully".into(),
            DashboardEvent::ErrorRaised { message, .. } => message.clone(),
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn agents(n: usize) -> String {
    format!("{n} agent{}", plural(n))
}
