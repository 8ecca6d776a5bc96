//! Resource-limited tool execution.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::config::LimiterConfig;
use super::result::RawExecution;
use super::scratch::ScratchFile;
use crate::catalog::Case;
use crate::config::BenchConfig;
use crate::error::RunnerError;
use crate::parser::{limiter_timed_out, parse_time_report};
use crate::tools::{resolve_program, ToolDescriptor};

/// Runs one tool on one case.
#[async_trait]
pub trait CaseRunner: Send + Sync {
    async fn run_case(
        &self,
        tool: &ToolDescriptor,
        case: &Case,
    ) -> Result<RawExecution, RunnerError>;
}

/// Executes commands under `time --verbose` and `runlim`.
///
/// The wall-clock bound is enforced by `runlim`; the elapsed time measured
/// here is only reported, never used to decide a timeout.
pub struct ResourceLimitedRunner {
    limiter: LimiterConfig,
    project_dir: PathBuf,
    scratch_dir: PathBuf,
    timeout_secs: u64,
    kill_delay_secs: u64,
    verbose: bool,
}

impl ResourceLimitedRunner {
    /// Creates a runner from the benchmark configuration.
    pub fn new(config: &BenchConfig) -> Result<Self, RunnerError> {
        Ok(Self {
            limiter: config.limiter.clone(),
            project_dir: std::path::absolute(&config.project_dir)?,
            scratch_dir: std::path::absolute(config.scratch_path())?,
            timeout_secs: config.timeout_secs,
            kill_delay_secs: config.kill_delay_secs,
            verbose: config.verbose,
        })
    }

    /// Wrapper arguments preceding the wrapped command.
    fn wrapper_args(
        &self,
        time_report: &ScratchFile,
        limiter_report: &ScratchFile,
        limit_secs: u64,
    ) -> Vec<String> {
        vec![
            "--verbose".to_string(),
            "-o".to_string(),
            time_report.path().display().to_string(),
            resolve_program(&self.project_dir, &self.limiter.runlim_command)
                .display()
                .to_string(),
            format!("--real-time-limit={}", limit_secs),
            format!("--output-file={}", limiter_report.path().display()),
            format!("--kill-delay={}", self.kill_delay_secs),
        ]
    }

    /// Runs `command args...` under both wrappers with a wall-clock bound.
    ///
    /// Wrapper reports are read into the returned [`RawExecution`] and their
    /// scratch files are removed before this returns, on every path.
    pub async fn run(
        &self,
        command: &str,
        args: &[String],
        limit_secs: u64,
    ) -> Result<RawExecution, RunnerError> {
        let limiter_report = ScratchFile::create(&self.scratch_dir, "output")?;
        let time_report = ScratchFile::create(&self.scratch_dir, "output")?;

        let mut full_args = self.wrapper_args(&time_report, &limiter_report, limit_secs);
        full_args.push(
            resolve_program(&self.project_dir, command)
                .display()
                .to_string(),
        );
        full_args.extend(args.iter().cloned());

        info!(
            "Running: {} {}",
            self.limiter.time_command,
            full_args.join(" ")
        );
        let start = Instant::now();
        let output = Command::new(resolve_program(
            &self.project_dir,
            &self.limiter.time_command,
        ))
        .args(&full_args)
        .current_dir(&self.project_dir)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| RunnerError::Spawn {
            command: self.limiter.time_command.clone(),
            reason: e.to_string(),
        })?;
        let elapsed = start.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if self.verbose {
            info!("Tool stdout:\n{}", stdout);
            info!("Tool stderr:\n{}", stderr);
        } else {
            debug!("Tool stdout:\n{}", stdout);
            debug!("Tool stderr:\n{}", stderr);
        }

        let timed_out = limiter_timed_out(&limiter_report.read_lossy());
        let report = parse_time_report(&time_report.read_lossy());

        Ok(RawExecution {
            stdout,
            stderr,
            exit_status: report.exit_status.or(output.status.code()),
            peak_memory_kb: report.peak_memory_kb,
            cpu_percent: report.cpu_percent,
            timed_out,
            elapsed,
        })
    }
}

#[async_trait]
impl CaseRunner for ResourceLimitedRunner {
    async fn run_case(
        &self,
        tool: &ToolDescriptor,
        case: &Case,
    ) -> Result<RawExecution, RunnerError> {
        let mut args = vec![
            case.source_file.clone(),
            case.contract.clone(),
            case.function_arg().to_string(),
            case.mode.flag().to_string(),
        ];
        args.extend(tool.extra_args.iter().cloned());
        self.run(&tool.command, &args, self.timeout_secs).await
    }
}
