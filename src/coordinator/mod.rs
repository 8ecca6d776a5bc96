//! Drives the tool x case matrix.
//!
//! For each tool, strictly in sequence:
//! 1. Rebuild with the tool's build pipeline (fresh output directory)
//! 2. Query the tool version once
//! 3. Run every case, in the given order, one at a time
//!
//! A build or version failure aborts the whole matrix. Per-case anomalies
//! become `unknown` results and the run continues.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::Case;
use crate::config::BenchConfig;
use crate::error::CoordinatorError;
use crate::parser::ResultParser;
use crate::runner::{CaseRunner, ExecutionResult, Outcome};
use crate::tools::{
    create_pipeline, query_version, BuildPipeline, BuildSystem, ToolDescriptor,
};

/// Timestamp format shared by run identifiers and result file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M";

/// Current UTC time formatted for run identifiers.
pub fn run_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// All results of one tool over the case list.
#[derive(Debug, Clone)]
pub struct ToolRun {
    /// `<tool>-<version>-tstamp-<timestamp>`.
    pub run_id: String,
    pub tool: String,
    pub version: String,
    /// One entry per case, in run order.
    pub results: Vec<ExecutionResult>,
}

impl ToolRun {
    pub fn summary(&self) -> RunSummary {
        let count = |outcome: Outcome| {
            self.results
                .iter()
                .filter(|r| r.outcome == outcome)
                .count()
        };
        let solved_times: Vec<f64> = self
            .results
            .iter()
            .filter(|r| r.is_solved())
            .map(|r| r.elapsed_secs)
            .collect();
        let avg_solved_time = if solved_times.is_empty() {
            0.0
        } else {
            solved_times.iter().sum::<f64>() / solved_times.len() as f64
        };

        RunSummary {
            run_id: self.run_id.clone(),
            total: self.results.len(),
            safe: count(Outcome::Safe),
            unsafe_: count(Outcome::Unsafe),
            unknown: count(Outcome::Unknown),
            correct: self
                .results
                .iter()
                .filter(|r| r.correct() == Some(true))
                .count(),
            incorrect: self
                .results
                .iter()
                .filter(|r| r.correct() == Some(false))
                .count(),
            avg_solved_time_secs: (avg_solved_time * 100.0).round() / 100.0,
        }
    }
}

/// Per-tool outcome counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub total: usize,
    pub safe: usize,
    #[serde(rename = "unsafe")]
    pub unsafe_: usize,
    pub unknown: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub avg_solved_time_secs: f64,
}

/// Results of a full matrix execution, keyed by run identifier in run order.
#[derive(Debug, Clone)]
pub struct RunBatch {
    /// Timestamp shared by every run of the batch.
    pub timestamp: String,
    pub runs: Vec<ToolRun>,
}

impl RunBatch {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            runs: Vec::new(),
        }
    }

    /// Results for `run_id`, if present.
    pub fn get(&self, run_id: &str) -> Option<&[ExecutionResult]> {
        self.runs
            .iter()
            .find(|run| run.run_id == run_id)
            .map(|run| run.results.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Sequential matrix driver.
pub struct RunCoordinator {
    config: BenchConfig,
    runner: Box<dyn CaseRunner>,
    forge: Box<dyn BuildPipeline>,
    crytic: Box<dyn BuildPipeline>,
}

impl RunCoordinator {
    pub fn new(config: &BenchConfig, runner: Box<dyn CaseRunner>) -> Self {
        Self {
            config: config.clone(),
            runner,
            forge: create_pipeline(BuildSystem::Forge),
            crytic: create_pipeline(BuildSystem::Crytic),
        }
    }

    /// Replaces the pipeline for its build system.
    pub fn with_pipeline(mut self, pipeline: Box<dyn BuildPipeline>) -> Self {
        match pipeline.system() {
            BuildSystem::Forge => self.forge = pipeline,
            BuildSystem::Crytic => self.crytic = pipeline,
        }
        self
    }

    fn pipeline(&self, system: BuildSystem) -> &dyn BuildPipeline {
        match system {
            BuildSystem::Forge => self.forge.as_ref(),
            BuildSystem::Crytic => self.crytic.as_ref(),
        }
    }

    /// Runs every tool over the first `limit` cases.
    ///
    /// `cases` must already be in the desired (shuffled) order; every tool
    /// sees the same list.
    pub async fn run_matrix(
        &self,
        tools: &[ToolDescriptor],
        cases: &[Case],
    ) -> Result<RunBatch, CoordinatorError> {
        let mut batch = RunBatch::new(run_timestamp());
        let cases = &cases[..cases.len().min(self.config.limit)];
        info!(
            "Running {} tools over {} cases (timeout {}s)",
            tools.len(),
            cases.len(),
            self.config.timeout_secs
        );

        for tool in tools {
            let run = self.run_tool(tool, cases, &batch.timestamp).await?;
            let summary = run.summary();
            info!(
                tool = %tool.name,
                "{}: {} safe, {} unsafe, {} unknown, {} incorrect (avg solved time {:.2}s)",
                summary.run_id,
                summary.safe,
                summary.unsafe_,
                summary.unknown,
                summary.incorrect,
                summary.avg_solved_time_secs
            );
            batch.runs.push(run);
        }

        Ok(batch)
    }

    async fn run_tool(
        &self,
        tool: &ToolDescriptor,
        cases: &[Case],
        timestamp: &str,
    ) -> Result<ToolRun, CoordinatorError> {
        info!(tool = %tool.name, build = %tool.build, "Preparing tool");
        self.pipeline(tool.build)
            .build(&self.config)
            .await
            .map_err(|source| CoordinatorError::Build {
                tool: tool.name.clone(),
                source,
            })?;

        let version = query_version(tool, &self.config.project_dir)
            .await
            .map_err(|source| CoordinatorError::Runner {
                tool: tool.name.clone(),
                source,
            })?;
        let run_id = tool.run_id(&version, timestamp);
        info!(tool = %tool.name, version = %version, "Run id: {}", run_id);

        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            let raw = self
                .runner
                .run_case(tool, case)
                .await
                .map_err(|source| CoordinatorError::Runner {
                    tool: tool.name.clone(),
                    source,
                })?;
            let result = ResultParser::parse(&raw, case, self.config.timeout_secs);
            if result.correct() == Some(false) {
                warn!(
                    tool = %tool.name,
                    case = %case.name(),
                    "Incorrect verdict '{}', expected '{}'",
                    result.outcome,
                    case.expected
                );
            } else {
                info!(
                    tool = %tool.name,
                    case = %case.name(),
                    "Result: {} in {:.2}s",
                    result.outcome,
                    result.elapsed_secs
                );
            }
            results.push(result);
        }

        Ok(ToolRun {
            run_id,
            tool: tool.name.clone(),
            version,
            results,
        })
    }
}
