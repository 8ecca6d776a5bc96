//! Foundry build pipeline.

use async_trait::async_trait;
use tracing::info;

use super::{reset_output_dir, run_build_command, BuildPipeline, BuildSystem};
use crate::config::BenchConfig;
use crate::error::BuildError;

/// Builds the project with `forge build --use <solc>`.
pub struct ForgePipeline {
    command: String,
}

impl ForgePipeline {
    pub fn new() -> Self {
        Self {
            command: "forge".to_string(),
        }
    }

    /// Uses a different `forge` executable.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }
}

impl Default for ForgePipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuildPipeline for ForgePipeline {
    fn system(&self) -> BuildSystem {
        BuildSystem::Forge
    }

    async fn build(&self, config: &BenchConfig) -> Result<(), BuildError> {
        info!("Building with forge...");
        reset_output_dir(&config.build_path())?;
        run_build_command(
            BuildSystem::Forge,
            &self.command,
            &["build", "--use", &config.solc_version],
            &config.project_dir,
        )
        .await
    }
}
