//! Error types for symbench operations.
//!
//! One error enum per subsystem:
//! - Case discovery (configuration errors in the build output)
//! - Build pipelines
//! - Resource-limited tool execution
//! - Result persistence
//! - Aggregation over persisted results
//!
//! Per-case tool anomalies (crashes, missing result lines, timeouts) are not
//! errors; they are folded into an `unknown` outcome by the parser.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while discovering cases from build artifacts.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Build output directory not found: {0}")]
    MissingBuildDir(PathBuf),

    #[error("Source file is not in the safe or unsafe directories: {0}")]
    UnclassifiedOutcome(String),

    #[error("Source file is neither in 'ds-test' nor in '1tx-abstract' directory: {0}")]
    UnclassifiedMode(String),

    #[error("Malformed build artifact '{path}': {reason}")]
    MalformedArtifact { path: PathBuf, reason: String },

    #[error("Failed to walk build output: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while running a build pipeline.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{system} build failed with exit code {code:?}: {stderr}")]
    Failed {
        system: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to launch {system} build: {reason}")]
    Spawn { system: String, reason: String },

    #[error("Failed to reset build output directory {path}: {reason}")]
    ResetOutput { path: PathBuf, reason: String },
}

/// Errors that can occur while executing a tool under the resource limiter.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Cannot create unique scratch file after {attempts} attempts, last try was: {last}")]
    ScratchExhausted { attempts: u32, last: PathBuf },

    #[error("Failed to launch '{command}': {reason}")]
    Spawn { command: String, reason: String },

    #[error("Version query '{command}' failed with exit code {code:?}: {stderr}")]
    VersionQuery {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while driving the tool x case matrix.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Build failed for tool '{tool}': {source}")]
    Build {
        tool: String,
        #[source]
        source: BuildError,
    },

    #[error("Runner error for tool '{tool}': {source}")]
    Runner {
        tool: String,
        #[source]
        source: RunnerError,
    },
}

/// Errors that can occur while persisting or loading results.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Result file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while aggregating persisted results.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("No data in result set")]
    EmptyResultSet,

    #[error("Some systems were run with differing timeouts: {0:?}. Delete the old results and run all with the same timeout")]
    MixedTimeouts(Vec<u64>),

    #[error("Solver '{solver}' was not run on instance '{instance}'")]
    MissingResult { solver: String, instance: String },

    #[error("Failed to write table '{path}': {source}")]
    WriteTable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
