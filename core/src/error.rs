use thiserror::Error;

use crate::types::ColumnKind;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    #[error("Invalid file format: {reason}")]
    InvalidFormat { reason: String },

    #[error("CSV file appears to be empty")]
    EmptyInput,

    #[error("Could not find {0} column")]
    MissingColumn(ColumnKind),

    #[error("Agent with initials '{id}' already exists")]
    DuplicateIdentifier { id: String },

    #[error("No agents match the selected filters")]
    EmptySelection,

    #[error("Please enter agent initials")]
    EmptyIdentifier,

    #[error("Unknown branch '{0}'")]
    UnknownBranch(String),

    #[error("Unknown position '{0}'")]
    UnknownPosition(String),

    #[error("Please select at least one branch and one position")]
    EmptyFilter,

    #[error("No agents to export")]
    EmptyRoster,

    #[error("No results to export")]
    NoResults,

    #[error("Please select a CSV file (got '{name}')")]
    NotCsvFile { name: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Stable tag used in notifications and the IPC stream.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::StorageUnavailable(_)       => "storage_unavailable",
            DashboardError::InvalidFormat { .. }        => "invalid_format",
            DashboardError::EmptyInput                  => "empty_input",
            DashboardError::MissingColumn(_)            => "missing_column",
            DashboardError::DuplicateIdentifier { .. }  => "duplicate_identifier",
            DashboardError::EmptySelection              => "empty_selection",
            DashboardError::EmptyIdentifier             => "empty_identifier",
            DashboardError::UnknownBranch(_)            => "unknown_branch",
            DashboardError::UnknownPosition(_)          => "unknown_position",
            DashboardError::EmptyFilter                 => "empty_filter",
            DashboardError::EmptyRoster                 => "empty_roster",
            DashboardError::NoResults                   => "no_results",
            DashboardError::NotCsvFile { .. }           => "not_csv_file",
            DashboardError::Serialization(_)            => "serialization",
            DashboardError::Csv(_)                      => "csv",
            DashboardError::Io(_)                       => "io",
        }
    }

    pub fn invalid_format(reason: impl Into<String>) -> Self {
        DashboardError::InvalidFormat { reason: reason.into() }
    }
}

pub type DashResult<T> = Result<T, DashboardError>;
