//! Aggregation engine: grouped averages and the ranked agent breakdown.
//!
//! Algorithm:
//!   1. Keep records whose branch and position are both selected.
//!      An empty result is EmptySelection, never a zero average.
//!   2. Overall mean over the filtered set.
//!   3. Per selected branch, per selected position, and per
//!      (branch, position) pair: mean and count. Empty groups are omitted.
//!   4. Rank by amount descending (stable) with deviation from the
//!      overall mean.
//!
//! Amounts are never rounded here; rounding is a formatting concern.

use crate::{
    error::{DashResult, DashboardError},
    matcher::MatchedAgentRecord,
    types::{Branch, Position},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Selected branches and positions. Both sets are non-empty.
/// Iteration follows the enums' canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    branches:  BTreeSet<Branch>,
    positions: BTreeSet<Position>,
}

impl Default for FilterSelection {
    /// All branches, all positions.
    fn default() -> Self {
        Self {
            branches:  Branch::ALL.into_iter().collect(),
            positions: Position::ALL.into_iter().collect(),
        }
    }
}

impl FilterSelection {
    pub fn new(
        branches: impl IntoIterator<Item = Branch>,
        positions: impl IntoIterator<Item = Position>,
    ) -> DashResult<Self> {
        let branches: BTreeSet<Branch> = branches.into_iter().collect();
        let positions: BTreeSet<Position> = positions.into_iter().collect();
        if branches.is_empty() || positions.is_empty() {
            return Err(DashboardError::EmptyFilter);
        }
        Ok(Self { branches, positions })
    }

    /// Build from optional code lists; `None` means "all".
    pub fn from_codes(
        branches: Option<&[String]>,
        positions: Option<&[String]>,
    ) -> DashResult<Self> {
        let branches = match branches {
            Some(codes) => codes
                .iter()
                .map(|c| c.trim().to_uppercase().parse())
                .collect::<DashResult<Vec<Branch>>>()?,
            None => Branch::ALL.to_vec(),
        };
        let positions = match positions {
            Some(codes) => codes
                .iter()
                .map(|c| c.trim().to_uppercase().parse())
                .collect::<DashResult<Vec<Position>>>()?,
            None => Position::ALL.to_vec(),
        };
        Self::new(branches, positions)
    }

    pub fn branches(&self) -> impl Iterator<Item = Branch> + '_ {
        self.branches.iter().copied()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions.iter().copied()
    }

    pub fn admits(&self, record: &MatchedAgentRecord) -> bool {
        self.branches.contains(&record.branch) && self.positions.contains(&record.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateBucket {
    pub average: f64,
    pub count:   usize,
}

impl AggregateBucket {
    /// None for an empty group.
    fn over<'a>(records: impl Iterator<Item = &'a MatchedAgentRecord>) -> Option<Self> {
        let amounts: Vec<f64> = records.map(|r| r.amount).collect();
        if amounts.is_empty() {
            return None;
        }
        Some(Self { average: mean(&amounts), count: amounts.len() })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchBucket {
    pub branch: Branch,
    #[serde(flatten)]
    pub bucket: AggregateBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionBucket {
    pub position: Position,
    #[serde(flatten)]
    pub bucket:   AggregateBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedBucket {
    pub branch:   Branch,
    pub position: Position,
    #[serde(flatten)]
    pub bucket:   AggregateBucket,
}

impl CombinedBucket {
    /// "<branch> <PositionPlural>", e.g. "TIJ Closers".
    pub fn label(&self) -> String {
        format!("{} {}", self.branch, self.position.plural_label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAgent {
    /// 1-based.
    pub rank:              usize,
    pub record:            MatchedAgentRecord,
    pub deviation:         f64,
    pub deviation_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub filter:            FilterSelection,
    pub agent_count:       usize,
    pub overall_average:   f64,
    pub branch_averages:   Vec<BranchBucket>,
    pub position_averages: Vec<PositionBucket>,
    pub combined_averages: Vec<CombinedBucket>,
    pub breakdown:         Vec<RankedAgent>,
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn aggregate(
    matched: &[MatchedAgentRecord],
    filter: &FilterSelection,
) -> DashResult<AggregateResult> {
    let filtered: Vec<&MatchedAgentRecord> = matched.iter().filter(|r| filter.admits(r)).collect();
    if filtered.is_empty() {
        return Err(DashboardError::EmptySelection);
    }

    let amounts: Vec<f64> = filtered.iter().map(|r| r.amount).collect();
    let overall_average = mean(&amounts);

    let branch_averages = filter
        .branches()
        .filter_map(|branch| {
            AggregateBucket::over(filtered.iter().copied().filter(|r| r.branch == branch))
                .map(|bucket| BranchBucket { branch, bucket })
        })
        .collect();

    let position_averages = filter
        .positions()
        .filter_map(|position| {
            AggregateBucket::over(filtered.iter().copied().filter(|r| r.position == position))
                .map(|bucket| PositionBucket { position, bucket })
        })
        .collect();

    let mut combined_averages = Vec::new();
    for branch in filter.branches() {
        for position in filter.positions() {
            let group = filtered
                .iter()
                .copied()
                .filter(|r| r.branch == branch && r.position == position);
            if let Some(bucket) = AggregateBucket::over(group) {
                combined_averages.push(CombinedBucket { branch, position, bucket });
            }
        }
    }

    let mut ranked = filtered.clone();
    // sort_by is stable: equal amounts keep their input order.
    ranked.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    let breakdown = ranked
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let deviation = record.amount - overall_average;
            let deviation_percent = if overall_average > 0.0 {
                deviation / overall_average * 100.0
            } else {
                0.0
            };
            RankedAgent {
                rank: i + 1,
                record: record.clone(),
                deviation,
                deviation_percent,
            }
        })
        .collect();

    log::debug!(
        "Aggregated {} of {} matched agents; overall average {overall_average:.2}",
        filtered.len(),
        matched.len()
    );

    Ok(AggregateResult {
        filter: filter.clone(),
        agent_count: filtered.len(),
        overall_average,
        branch_averages,
        position_averages,
        combined_averages,
        breakdown,
    })
}
