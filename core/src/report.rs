//! Report formatting: summary cards, the ranked breakdown table and the
//! results CSV export.
//!
//! All rounding to whole dollars happens here.

use crate::{
    aggregation::{AggregateResult, RankedAgent},
    error::DashResult,
};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub const REPORT_TITLE: &str = "Agent Averages Report";

/// Whole-dollar US currency: `$1,234`, `-$50`.
pub fn format_currency(value: f64) -> String {
    let whole = value.abs().round() as u64;
    let sign = if value < 0.0 && whole > 0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(whole))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn sign_of(value: f64) -> &'static str {
    if value >= 0.0 { "+" } else { "-" }
}

/// `+$50` / `-$50`. Non-negative values always carry `+`.
pub fn format_signed_currency(value: f64) -> String {
    format!("{}{}", sign_of(value), format_currency(value.abs()))
}

/// Percentage half of a deviation: `+33%` / `-33%`.
///
/// The sign follows `deviation`, not `percent`: when the overall average is
/// not positive the percentage is 0 and a below-average agent shows `0%`.
pub fn format_deviation_percent(percent: f64, deviation: f64) -> String {
    let whole = percent.abs().round() as u64;
    let sign = if deviation >= 0.0 {
        "+"
    } else if whole > 0 {
        "-"
    } else {
        ""
    };
    format!("{sign}{whole}%")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Positive,
    Negative,
    Neutral,
}

impl Comparison {
    fn of(deviation: f64) -> Self {
        if deviation > 0.0 {
            Comparison::Positive
        } else if deviation < 0.0 {
            Comparison::Negative
        } else {
            Comparison::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCard {
    pub label: String,
    pub value: String,
    pub count: usize,
    /// Only the overall card is highlighted.
    pub highlight: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
    pub rank:       usize,
    pub agent:      String,
    pub branch:     String,
    pub position:   String,
    pub collected:  String,
    pub vs_average: String,
    pub comparison: Comparison,
}

impl BreakdownRow {
    fn from_ranked(entry: &RankedAgent) -> Self {
        Self {
            rank:       entry.rank,
            agent:      entry.record.id.clone(),
            branch:     entry.record.branch.to_string(),
            position:   entry.record.position.label().to_string(),
            collected:  format_currency(entry.record.amount),
            vs_average: format!(
                "{} ({})",
                format_signed_currency(entry.deviation),
                format_deviation_percent(entry.deviation_percent, entry.deviation)
            ),
            comparison: Comparison::of(entry.deviation),
        }
    }
}

pub fn summary_cards(result: &AggregateResult) -> Vec<SummaryCard> {
    let card = |label: String, average: f64, count: usize| SummaryCard {
        label,
        value: format_currency(average),
        count,
        highlight: false,
    };

    let mut cards = vec![SummaryCard {
        highlight: true,
        ..card("Overall Average".into(), result.overall_average, result.agent_count)
    }];
    cards.extend(result.branch_averages.iter().map(|b| {
        card(format!("{} Average", b.branch), b.bucket.average, b.bucket.count)
    }));
    cards.extend(result.position_averages.iter().map(|p| {
        card(
            format!("{} Average", p.position.plural_label()),
            p.bucket.average,
            p.bucket.count,
        )
    }));
    cards.extend(
        result
            .combined_averages
            .iter()
            .map(|c| card(c.label(), c.bucket.average, c.bucket.count)),
    );
    cards
}

pub fn breakdown_rows(result: &AggregateResult) -> Vec<BreakdownRow> {
    result.breakdown.iter().map(BreakdownRow::from_ranked).collect()
}

// ── CSV export ──────────────────────────────────────────────────────

/// `agent_averages_<YYYY-MM-DD>.csv`
pub fn results_file_name(now: DateTime<Local>) -> String {
    format!("agent_averages_{}.csv", now.format("%Y-%m-%d"))
}

/// `agent_roster_<YYYY-MM-DD>.json`
pub fn roster_file_name(now: DateTime<Local>) -> String {
    format!("agent_roster_{}.json", now.format("%Y-%m-%d"))
}

/// Write one block of records; fields containing commas get quoted.
fn write_block(rows: &[Vec<String>]) -> DashResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn row<I, S>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fields.into_iter().map(Into::into).collect()
}

/// Render the full results export: title, timestamp, then the
/// OVERALL / BRANCH / POSITION / COMBINED / AGENT BREAKDOWN sections
/// separated by blank lines.
pub fn export_results_csv(result: &AggregateResult, generated_at: DateTime<Local>) -> DashResult<String> {
    let mut sections: Vec<Vec<Vec<String>>> = Vec::new();

    sections.push(vec![
        row([REPORT_TITLE.to_string()]),
        row([format!("Generated: {}", generated_at.format("%-m/%-d/%Y, %-I:%M:%S %p"))]),
    ]);

    sections.push(vec![
        row(["OVERALL AVERAGE"]),
        row(["Average".to_string(), format_currency(result.overall_average)]),
        row(["Agents".to_string(), result.agent_count.to_string()]),
    ]);

    let mut branch = vec![row(["BRANCH AVERAGES"]), row(["Branch", "Average", "Agents"])];
    branch.extend(result.branch_averages.iter().map(|b| {
        row([
            b.branch.to_string(),
            format_currency(b.bucket.average),
            b.bucket.count.to_string(),
        ])
    }));
    sections.push(branch);

    let mut position = vec![row(["POSITION AVERAGES"]), row(["Position", "Average", "Agents"])];
    position.extend(result.position_averages.iter().map(|p| {
        row([
            p.position.to_string(),
            format_currency(p.bucket.average),
            p.bucket.count.to_string(),
        ])
    }));
    sections.push(position);

    let mut combined = vec![row(["COMBINED AVERAGES"]), row(["Category", "Average", "Agents"])];
    combined.extend(result.combined_averages.iter().map(|c| {
        row([
            c.label(),
            format_currency(c.bucket.average),
            c.bucket.count.to_string(),
        ])
    }));
    sections.push(combined);

    let mut agents = vec![
        row(["AGENT BREAKDOWN"]),
        row(["Rank", "Agent", "Branch", "Position", "Collected", "vs Average", "vs Average %"]),
    ];
    agents.extend(result.breakdown.iter().map(|entry| {
        row([
            entry.rank.to_string(),
            entry.record.id.clone(),
            entry.record.branch.to_string(),
            entry.record.position.to_string(),
            format_currency(entry.record.amount),
            format_signed_currency(entry.deviation),
            format_deviation_percent(entry.deviation_percent, entry.deviation),
        ])
    }));
    sections.push(agents);

    let blocks = sections
        .iter()
        .map(|s| write_block(s))
        .collect::<DashResult<Vec<String>>>()?;
    Ok(blocks.join("\n"))
}
