//! Line-oriented CSV reader for CRM exports.
//!
//! The dialect is deliberately small: comma separator, `"` toggles quoting,
//! fields are trimmed. Escaped quotes (`""`) inside a quoted field are not
//! recognised; each `"` simply flips the quote state.

use crate::error::{DashResult, DashboardError};

pub type Row = Vec<String>;

/// Split one line into trimmed fields.
pub fn parse_line(line: &str) -> Row {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Parse a whole document. Blank lines are dropped; at least a header and
/// one data line must remain.
pub fn parse(text: &str) -> DashResult<Vec<Row>> {
    let rows: Vec<Row> = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect();

    if rows.len() < 2 {
        return Err(DashboardError::EmptyInput);
    }
    log::debug!("Parsed {} CSV rows (including header)", rows.len());
    Ok(rows)
}
