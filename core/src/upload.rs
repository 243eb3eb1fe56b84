//! File reads for CRM uploads, the one asynchronous boundary.
//!
//! A new upload does not cancel an older one. Instead every upload gets a
//! ticket from the UploadGate, and only the most recently issued ticket is
//! allowed to apply its content.

use crate::error::{DashResult, DashboardError};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    generation:    u64,
    pub file_name: String,
}

impl UploadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct UploadGate {
    latest: u64,
}

impl UploadGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for `file_name`. Only `.csv` names are accepted;
    /// a rejected name does not advance the generation.
    pub fn issue(&mut self, file_name: &str) -> DashResult<UploadTicket> {
        if !file_name.to_lowercase().ends_with(".csv") {
            return Err(DashboardError::NotCsvFile { name: file_name.to_string() });
        }
        self.latest += 1;
        Ok(UploadTicket {
            generation: self.latest,
            file_name:  file_name.to_string(),
        })
    }

    pub fn is_current(&self, ticket: &UploadTicket) -> bool {
        ticket.generation == self.latest
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest
    }
}

/// Read an uploaded file as text.
pub async fn read_upload(path: impl AsRef<Path>) -> DashResult<String> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await?;
    log::debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(text)
}
