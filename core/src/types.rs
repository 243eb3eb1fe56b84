//! Shared primitive types used across the whole pipeline.

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Agent identity as it appears in the roster and in CRM exports:
/// trimmed and upper-cased.
pub type AgentId = String;

/// Trim and upper-case a raw identifier.
pub fn normalize_id(raw: &str) -> AgentId {
    raw.trim().to_uppercase()
}

/// Organizational site code. Declaration order is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Branch {
    #[serde(rename = "TIJ")]
    Tij,
    #[serde(rename = "RSA")]
    Rsa,
    #[serde(rename = "OVS")]
    Ovs,
}

impl Branch {
    pub const ALL: [Branch; 3] = [Branch::Tij, Branch::Rsa, Branch::Ovs];

    pub fn code(self) -> &'static str {
        match self {
            Branch::Tij => "TIJ",
            Branch::Rsa => "RSA",
            Branch::Ovs => "OVS",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Branch {
    type Err = DashboardError;

    /// Exact match on the branch code; the import path relies on this
    /// being case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Branch::ALL
            .into_iter()
            .find(|b| b.code() == s)
            .ok_or_else(|| DashboardError::UnknownBranch(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "CLOSER")]
    Closer,
    #[serde(rename = "DIALER")]
    Dialer,
}

impl Position {
    pub const ALL: [Position; 2] = [Position::Closer, Position::Dialer];

    pub fn code(self) -> &'static str {
        match self {
            Position::Closer => "CLOSER",
            Position::Dialer => "DIALER",
        }
    }

    /// Singular label shown in roster and breakdown tables.
    pub fn label(self) -> &'static str {
        match self {
            Position::Closer => "Closer",
            Position::Dialer => "Dialer",
        }
    }

    /// Plural label used in combined bucket names ("TIJ Closers").
    pub fn plural_label(self) -> &'static str {
        match self {
            Position::Closer => "Closers",
            Position::Dialer => "Dialers",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Position {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::ALL
            .into_iter()
            .find(|p| p.code() == s)
            .ok_or_else(|| DashboardError::UnknownPosition(s.to_string()))
    }
}

/// Which CSV column failed discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Agent,
    Amount,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Agent  => f.write_str("Agent"),
            ColumnKind::Amount => f.write_str("Collected/Sales"),
        }
    }
}
