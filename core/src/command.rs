use serde::{Deserialize, Serialize};

/// All user-issued commands.
/// Variants are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DashboardCommand {
    // ── Roster ────────────────────────────────────
    AddAgent {
        initials: String,
        branch:   String,
        position: String,
    },
    RemoveAgent {
        initials: String,
    },
    ImportRoster {
        path: String,
    },
    ExportRoster {
        path: String,
    },

    // ── Sales data ────────────────────────────────
    LoadCsv {
        path: String,
    },

    // ── Results ───────────────────────────────────
    /// `None` selects every branch / position.
    Calculate {
        #[serde(default)]
        branches:  Option<Vec<String>>,
        #[serde(default)]
        positions: Option<Vec<String>>,
    },
    ExportResults {
        path: String,
    },
}
