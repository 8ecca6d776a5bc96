//! Comparative statistics over persisted results.
//!
//! [`Aggregator::new`] validates the result set before anything is derived:
//! it must be non-empty and every row must share one timeout bound.
//! Solvers and instances are always iterated in sorted order.

pub mod comparison;
pub mod curve;
pub mod instance;
pub mod tables;

use std::collections::BTreeSet;

use tracing::info;

pub use comparison::{compare, Comparison, ComparisonPoint};
pub use curve::{cumulative_curve, AggregateCurve, CurvePoint};
pub use instance::{best_time_table, instance_label, BestTimeTable, InstanceRow};
pub use tables::write_tables;

use crate::config::BenchConfig;
use crate::error::AggregateError;
use crate::store::ResultRow;

/// Derivations over one validated result set.
pub struct Aggregator {
    rows: Vec<ResultRow>,
    timeout_secs: u64,
    horizon_secs: u64,
}

impl Aggregator {
    /// Validates `rows` and builds the aggregator.
    pub fn new(config: &BenchConfig, rows: Vec<ResultRow>) -> Result<Self, AggregateError> {
        let timeout_secs = check_single_timeout(&rows)?;
        info!(
            "Aggregating {} results from {} solvers (timeout {}s)",
            rows.len(),
            rows.iter().map(|r| &r.solver).collect::<BTreeSet<_>>().len(),
            timeout_secs
        );
        Ok(Self {
            rows,
            timeout_secs,
            horizon_secs: config.curve_horizon_secs,
        })
    }

    /// The timeout bound shared by every row.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Distinct solvers, sorted.
    pub fn solvers(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.solver.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Cumulative-solve curve for `solver`, over solved rows only.
    pub fn cumulative_curve(&self, solver: &str) -> AggregateCurve {
        let times: Vec<f64> = self
            .rows
            .iter()
            .filter(|r| r.solver == solver && r.solved)
            .map(|r| r.t)
            .collect();
        AggregateCurve {
            solver: solver.to_string(),
            points: cumulative_curve(&times, self.horizon_secs),
        }
    }

    /// One curve per solver.
    pub fn curves(&self) -> Vec<AggregateCurve> {
        self.solvers()
            .iter()
            .map(|solver| self.cumulative_curve(solver))
            .collect()
    }

    /// One comparison per solver pair `(a, b)` with `a < b`.
    pub fn comparisons(&self) -> Vec<Comparison> {
        let solvers = self.solvers();
        let mut out = Vec::new();
        for (i, a) in solvers.iter().enumerate() {
            for b in &solvers[i + 1..] {
                out.push(compare(a, b, &self.rows));
            }
        }
        out
    }

    /// Per-instance best times for every solver.
    pub fn best_time_table(&self) -> Result<BestTimeTable, AggregateError> {
        best_time_table(&self.solvers(), &self.rows)
    }
}

/// Returns the single timeout shared by all rows.
pub fn check_single_timeout(rows: &[ResultRow]) -> Result<u64, AggregateError> {
    let timeouts: BTreeSet<u64> = rows.iter().map(|r| r.tout).collect();
    match timeouts.len() {
        0 => Err(AggregateError::EmptyResultSet),
        1 => Ok(timeouts.into_iter().next().unwrap_or_default()),
        _ => Err(AggregateError::MixedTimeouts(timeouts.into_iter().collect())),
    }
}
