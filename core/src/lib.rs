//! Agent averages dashboard core.
//!
//! Roster persistence, CRM CSV ingestion, agent matching and grouped
//! averages. Everything except `session` and `upload` is synchronous and
//! free of side effects beyond the roster store.

pub mod aggregation;
pub mod command;
pub mod config;
pub mod csv_parser;
pub mod error;
pub mod event;
pub mod extractor;
pub mod matcher;
pub mod report;
pub mod roster;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod upload;
