//! Benchmark configuration.
//!
//! A single [`BenchConfig`] is built once by the CLI and passed by reference
//! into the catalog, runner, coordinator and aggregator. Tool descriptors are
//! static configuration: the built-in set, or a YAML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::runner::LimiterConfig;
use crate::tools::{BuildSystem, ToolDescriptor};

/// Default wall-clock limit per case, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 25;

/// Grace period the limiter waits before force-killing a timed-out tool.
pub const DEFAULT_KILL_DELAY_SECS: u64 = 10;

/// Default solc version passed to the forge pipeline.
pub const DEFAULT_SOLC_VERSION: &str = "0.8.19";

/// Upper bound (exclusive) of the cumulative-solve curve, in seconds.
pub const DEFAULT_CURVE_HORIZON_SECS: u64 = 3600;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read tool configuration '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid tool configuration '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration shared by every stage of a benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Root of the benchmark project (contains `src/`, `tools/`, build output).
    pub project_dir: PathBuf,
    /// Build output directory, relative to `project_dir`.
    pub build_dir: PathBuf,
    /// Directory for per-invocation telemetry scratch files, relative to `project_dir`.
    pub scratch_dir: PathBuf,
    /// Directory that receives result files.
    pub results_dir: PathBuf,
    /// Wall-clock limit per case.
    pub timeout_secs: u64,
    /// Grace period before the limiter force-kills.
    pub kill_delay_secs: u64,
    /// solc version used by the forge pipeline and recorded in results.
    pub solc_version: String,
    /// Seed for the case shuffle.
    pub seed: u64,
    /// Maximum number of cases to run per tool.
    pub limit: usize,
    /// Log full tool output.
    pub verbose: bool,
    /// Exclusive upper bound of the cumulative-solve curve.
    pub curve_horizon_secs: u64,
    /// Wrapper executables.
    pub limiter: LimiterConfig,
    /// Tools to benchmark, in run order.
    pub tools: Vec<ToolDescriptor>,
}

impl BenchConfig {
    /// Creates a configuration rooted at `project_dir` with defaults.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            build_dir: PathBuf::from("out"),
            scratch_dir: PathBuf::from("out"),
            results_dir: PathBuf::from("."),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            kill_delay_secs: DEFAULT_KILL_DELAY_SECS,
            solc_version: DEFAULT_SOLC_VERSION.to_string(),
            seed: 1,
            limit: 100_000,
            verbose: false,
            curve_horizon_secs: DEFAULT_CURVE_HORIZON_SECS,
            limiter: LimiterConfig::default(),
            tools: default_tools(),
        }
    }

    /// Sets the per-case timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the shuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the case limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the solc version.
    pub fn with_solc_version(mut self, version: impl Into<String>) -> Self {
        self.solc_version = version.into();
        self
    }

    /// Moves the telemetry scratch files, e.g. outside the build output that
    /// every tool build wipes. Relative paths resolve against `project_dir`.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Sets the results directory.
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    /// Sets the wrapper executables.
    pub fn with_limiter(mut self, limiter: LimiterConfig) -> Self {
        self.limiter = limiter;
        self
    }

    /// Replaces the tool list.
    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }

    /// Enables verbose tool output logging.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the exclusive upper bound of the cumulative-solve curve.
    pub fn with_curve_horizon(mut self, secs: u64) -> Self {
        self.curve_horizon_secs = secs;
        self
    }

    /// Absolute-or-relative path of the build output directory.
    pub fn build_path(&self) -> PathBuf {
        self.project_dir.join(&self.build_dir)
    }

    /// Path of the scratch directory.
    pub fn scratch_path(&self) -> PathBuf {
        self.project_dir.join(&self.scratch_dir)
    }

    /// Checks the configuration for values that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "timeout must be at least one second".to_string(),
            ));
        }
        if self.tools.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "no tools configured".to_string(),
            ));
        }
        let mut names: Vec<&str> = self.tools.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigError::ValidationFailed(format!(
                "duplicate tool name '{}'",
                pair[0]
            )));
        }
        Ok(())
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// On-disk shape of a tool configuration file.
#[derive(Debug, Deserialize)]
struct ToolFile {
    tools: Vec<ToolDescriptor>,
}

/// Loads tool descriptors from a YAML file.
pub fn load_tools(path: &Path) -> Result<Vec<ToolDescriptor>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ToolFile = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.tools)
}

/// The built-in tool set: hevm with two SMT backends, and halmos.
pub fn default_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "hevm-cvc5",
            "tools/hevm.sh",
            "tools/hevm_version.sh",
            BuildSystem::Forge,
        )
        .with_extra_args(["--solver", "cvc5"]),
        ToolDescriptor::new(
            "hevm-z3",
            "tools/hevm.sh",
            "tools/hevm_version.sh",
            BuildSystem::Forge,
        )
        .with_extra_args(["--solver", "z3"]),
        ToolDescriptor::new(
            "halmos",
            "tools/halmos.sh",
            "tools/halmos_version.sh",
            BuildSystem::Crytic,
        ),
    ]
}
