//! Verification tools and the build pipelines they depend on.
//!
//! Each tool is an opaque executable invoked as
//! `<tool> <source-file> <contract> <function-or-empty> <0|1> [extra...]`,
//! plus a companion `<tool>-version` command. Tools are grouped by the build
//! system that produces their inputs; the two build systems write
//! incompatible output layouts, so every tool gets a fresh build.

pub mod crytic;
pub mod forge;

use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

pub use crytic::CryticPipeline;
pub use forge::ForgePipeline;

use crate::config::BenchConfig;
use crate::error::{BuildError, RunnerError};

/// Supported build systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildSystem {
    /// Foundry's `forge build`.
    Forge,
    /// `crytic-compile`.
    Crytic,
}

impl BuildSystem {
    pub fn display_name(&self) -> &'static str {
        match self {
            BuildSystem::Forge => "forge",
            BuildSystem::Crytic => "crytic",
        }
    }
}

impl std::fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for BuildSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forge" | "foundry" => Ok(BuildSystem::Forge),
            "crytic" | "crytic-compile" => Ok(BuildSystem::Crytic),
            other => Err(format!("Unknown build system: {}", other)),
        }
    }
}

/// Static description of one benchmarked tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Name used in run identifiers and result tables.
    pub name: String,
    /// Executable invoked per case.
    pub command: String,
    /// Executable that prints the tool version.
    pub version_command: String,
    /// Arguments appended after the standard case arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Build system producing this tool's inputs.
    pub build: BuildSystem,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        version_command: impl Into<String>,
        build: BuildSystem,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            version_command: version_command.into(),
            extra_args: Vec::new(),
            build,
        }
    }

    /// Sets the fixed extra arguments.
    pub fn with_extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Run identifier: `<tool>-<version>-tstamp-<timestamp>`.
    pub fn run_id(&self, version: &str, timestamp: &str) -> String {
        format!("{}-{}-tstamp-{}", self.name, version, timestamp)
    }
}

/// A build step producing case artifacts.
#[async_trait]
pub trait BuildPipeline: Send + Sync {
    /// Returns the build system.
    fn system(&self) -> BuildSystem;

    /// Discards previous build output and rebuilds the project.
    async fn build(&self, config: &BenchConfig) -> Result<(), BuildError>;
}

/// Creates the pipeline for the given build system.
pub fn create_pipeline(system: BuildSystem) -> Box<dyn BuildPipeline> {
    match system {
        BuildSystem::Forge => Box::new(ForgePipeline::new()),
        BuildSystem::Crytic => Box::new(CryticPipeline::new()),
    }
}

/// Removes and recreates the build output directory.
pub fn reset_output_dir(path: &Path) -> Result<(), BuildError> {
    let reset_err = |e: std::io::Error| BuildError::ResetOutput {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    match std::fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(reset_err(e)),
    }
    std::fs::create_dir_all(path).map_err(reset_err)
}

/// Runs a build command in the project directory; non-zero exit is a failure.
pub(crate) async fn run_build_command(
    system: BuildSystem,
    command: &str,
    args: &[&str],
    project_dir: &Path,
) -> Result<(), BuildError> {
    info!("Running: {} {}", command, args.join(" "));
    let output = Command::new(resolve_program(project_dir, command))
        .args(args)
        .current_dir(project_dir)
        .output()
        .await
        .map_err(|e| BuildError::Spawn {
            system: system.to_string(),
            reason: format!("{}: {}", command, e),
        })?;

    if !output.status.success() {
        return Err(BuildError::Failed {
            system: system.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }
    debug!("{} build finished", system);
    Ok(())
}

/// Queries a tool's version string (single line, trailing whitespace removed).
pub async fn query_version(
    tool: &ToolDescriptor,
    project_dir: &Path,
) -> Result<String, RunnerError> {
    info!("Running: {}", tool.version_command);
    let output: Output = Command::new(resolve_program(project_dir, &tool.version_command))
        .current_dir(project_dir)
        .output()
        .await
        .map_err(|e| RunnerError::Spawn {
            command: tool.version_command.clone(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(RunnerError::VersionQuery {
            command: tool.version_command.clone(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}

/// Resolves relative executable paths (`tools/x.sh`) against the project
/// directory; bare names are left for `PATH` lookup.
pub fn resolve_program(project_dir: &Path, command: &str) -> PathBuf {
    let path = Path::new(command);
    if path.is_relative() && path.components().count() > 1 {
        project_dir.join(path)
    } else {
        path.to_path_buf()
    }
}
