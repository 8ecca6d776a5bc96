//! Persisted result shapes.

use serde::{Deserialize, Serialize};

use crate::runner::ExecutionResult;

/// One per-case entry of a JSON result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Case name, `file:Contract[:function]`.
    pub name: String,
    pub solc_version: String,
    /// True for unit-function cases.
    pub ds: bool,
    pub solved: bool,
    /// Absent when unsolved.
    pub correct: Option<bool>,
    /// Wall time in seconds.
    pub t: f64,
    /// Timeout bound in seconds.
    pub tout: u64,
    #[serde(rename = "memMB")]
    pub mem_mb: Option<f64>,
    pub exit_status: Option<i32>,
    /// Tool standard error.
    pub out: String,
}

impl ResultRecord {
    pub fn from_result(result: &ExecutionResult, solc_version: &str) -> Self {
        Self {
            name: result.case.name(),
            solc_version: solc_version.to_string(),
            ds: result.case.is_unit_function(),
            solved: result.is_solved(),
            correct: result.correct(),
            t: result.elapsed_secs,
            tout: result.timeout_secs,
            mem_mb: result.peak_memory_mb,
            exit_status: result.exit_status,
            out: result.diagnostics.clone(),
        }
    }
}

/// Flattened view of a record used by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Run identifier the record was filed under.
    pub solver: String,
    pub name: String,
    pub solved: bool,
    pub t: f64,
    pub tout: u64,
}

impl ResultRow {
    pub fn from_record(solver: &str, record: &ResultRecord) -> Self {
        Self {
            solver: solver.to_string(),
            name: record.name.clone(),
            solved: record.solved,
            t: record.t,
            tout: record.tout,
        }
    }

    /// Measured time if solved, the timeout bound otherwise.
    pub fn time_or_timeout(&self) -> f64 {
        if self.solved {
            self.t
        } else {
            self.tout as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Case;
    use crate::runner::Outcome;

    #[test]
    fn test_record_json_field_names() {
        let result = ExecutionResult {
            case: Case::new("src/safe/ds-test/A.sol", "ATest", Some("prove_a".into())).unwrap(),
            outcome: Outcome::Unknown,
            elapsed_secs: 25.4,
            peak_memory_mb: Some(12.5),
            cpu_percent: Some(99),
            exit_status: None,
            diagnostics: "killed".to_string(),
            timeout_secs: 25,
        };
        let record = ResultRecord::from_result(&result, "0.8.19");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], "src/safe/ds-test/A.sol:ATest:prove_a");
        assert_eq!(json["ds"], true);
        assert_eq!(json["solved"], false);
        assert!(json["correct"].is_null());
        assert_eq!(json["memMB"], 12.5);
        assert!(json["exit_status"].is_null());
        assert_eq!(json["tout"], 25);
    }

    #[test]
    fn test_time_or_timeout() {
        let mut row = ResultRow {
            solver: "a".to_string(),
            name: "n".to_string(),
            solved: true,
            t: 3.2,
            tout: 25,
        };
        assert_eq!(row.time_or_timeout(), 3.2);
        row.solved = false;
        assert_eq!(row.time_or_timeout(), 25.0);
    }
}
