//! Sales record extraction: header discovery and per-row amount parsing.

use crate::{
    config::ColumnRules,
    csv_parser::Row,
    error::{DashResult, DashboardError},
    types::{normalize_id, AgentId, ColumnKind},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub agent_id: AgentId,
    pub amount:   f64,
}

impl SalesRecord {
    pub fn new(agent_id: &str, amount: f64) -> Self {
        Self { agent_id: agent_id.to_string(), amount }
    }
}

/// Indices of the two columns the pipeline needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub agent:  usize,
    pub amount: usize,
}

impl ColumnRules {
    /// Resolve the agent and amount columns from a header row.
    pub fn discover(&self, header: &[String]) -> DashResult<ColumnMap> {
        let header: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

        let agent = header
            .iter()
            .position(|h| self.agent_headers.iter().any(|name| h == name))
            .ok_or(DashboardError::MissingColumn(ColumnKind::Agent))?;
        let amount = header
            .iter()
            .position(|h| self.amount_keywords.iter().any(|kw| h.contains(kw.as_str())))
            .ok_or(DashboardError::MissingColumn(ColumnKind::Amount))?;

        Ok(ColumnMap { agent, amount })
    }

    /// True for blank ids and embedded sub-header / total rows.
    ///
    /// This is substring based, so a real agent whose id contains a marker
    /// (e.g. "TOTALA") is skipped as well.
    pub fn is_skipped_id(&self, id: &str) -> bool {
        id.is_empty() || self.skip_markers.iter().any(|m| id.contains(m.as_str()))
    }
}

/// Extract `{agent_id, amount}` pairs; `rows[0]` is the header.
pub fn extract(rows: &[Row], rules: &ColumnRules) -> DashResult<Vec<SalesRecord>> {
    let (header, data) = rows.split_first().ok_or(DashboardError::EmptyInput)?;
    let columns = rules.discover(header)?;

    let mut records = Vec::with_capacity(data.len());
    let mut skipped_rows = 0usize;
    for row in data {
        let agent_id = normalize_id(row.get(columns.agent).map(String::as_str).unwrap_or(""));
        if rules.is_skipped_id(&agent_id) {
            skipped_rows += 1;
            continue;
        }
        let amount = parse_currency(row.get(columns.amount).map(String::as_str).unwrap_or(""));
        records.push(SalesRecord { agent_id, amount });
    }

    log::debug!(
        "Extracted {} sales records (agent col {}, amount col {}, {} rows skipped)",
        records.len(),
        columns.agent,
        columns.amount,
        skipped_rows
    );
    Ok(records)
}

/// Normalize a currency cell to a number.
///
/// Strips `$`, `,` and whitespace, then reads the longest leading decimal
/// literal. Anything unreadable or non-finite is 0.
pub fn parse_currency(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    leading_decimal(&cleaned)
        .and_then(|lit| lit.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Longest prefix of `s` shaped like `[+-]digits[.digits][(e|E)[+-]digits]`.
fn leading_decimal(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(&s[..end])
}
