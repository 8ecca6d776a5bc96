//! Wrapper executables for resource-limited runs.

use serde::{Deserialize, Serialize};

/// The two wrappers every tool invocation runs under.
///
/// `time --verbose` reports memory, CPU and exit status; `runlim` enforces
/// the wall-clock bound and reports whether it killed the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// GNU `time` executable.
    pub time_command: String,
    /// `runlim` executable.
    pub runlim_command: String,
}

impl LimiterConfig {
    pub fn new(time_command: impl Into<String>, runlim_command: impl Into<String>) -> Self {
        Self {
            time_command: time_command.into(),
            runlim_command: runlim_command.into(),
        }
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self::new("time", "runlim")
    }
}
