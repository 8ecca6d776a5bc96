//! Raw and classified results of a single tool invocation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{Case, ExpectedOutcome};

/// Three-valued verdict of a tool on a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Safe,
    Unsafe,
    Unknown,
}

impl Outcome {
    /// Parses the token of a `result: <token>` line.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "safe" => Some(Outcome::Safe),
            "unsafe" => Some(Outcome::Unsafe),
            "unknown" => Some(Outcome::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Safe => "safe",
            Outcome::Unsafe => "unsafe",
            Outcome::Unknown => "unknown",
        }
    }

    /// True for `safe` and `unsafe`.
    pub fn is_solved(&self) -> bool {
        !matches!(self, Outcome::Unknown)
    }
}

impl From<ExpectedOutcome> for Outcome {
    fn from(expected: ExpectedOutcome) -> Self {
        match expected {
            ExpectedOutcome::Safe => Outcome::Safe,
            ExpectedOutcome::Unsafe => Outcome::Unsafe,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the limiter and time wrappers observed for one invocation.
///
/// Every telemetry field is best-effort and independently optional.
#[derive(Debug, Clone, Default)]
pub struct RawExecution {
    /// Tool standard output.
    pub stdout: String,
    /// Tool standard error.
    pub stderr: String,
    /// Exit status reported by the time wrapper.
    pub exit_status: Option<i32>,
    /// Peak resident set size in kilobytes.
    pub peak_memory_kb: Option<u64>,
    /// CPU utilisation percentage.
    pub cpu_percent: Option<u32>,
    /// Limiter reported an out-of-time kill.
    pub timed_out: bool,
    /// Wall time measured around the whole invocation.
    pub elapsed: Duration,
}

/// Classified result of one tool on one case. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub case: Case,
    pub outcome: Outcome,
    /// Wall time in seconds.
    pub elapsed_secs: f64,
    pub peak_memory_mb: Option<f64>,
    pub cpu_percent: Option<u32>,
    pub exit_status: Option<i32>,
    /// Tool standard error.
    pub diagnostics: String,
    /// Wall-clock bound the case ran under.
    pub timeout_secs: u64,
}

impl ExecutionResult {
    /// `None` for `unknown`, otherwise whether the verdict matches the ground truth.
    pub fn correct(&self) -> Option<bool> {
        if self.outcome.is_solved() {
            Some(self.outcome == Outcome::from(self.case.expected))
        } else {
            None
        }
    }

    pub fn is_solved(&self) -> bool {
        self.outcome.is_solved()
    }
}
