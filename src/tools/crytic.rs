//! crytic-compile build pipeline.

use async_trait::async_trait;
use tracing::info;

use super::{reset_output_dir, run_build_command, BuildPipeline, BuildSystem};
use crate::config::BenchConfig;
use crate::error::BuildError;

/// Builds the project with `crytic-compile <project>`.
pub struct CryticPipeline {
    command: String,
}

impl CryticPipeline {
    pub fn new() -> Self {
        Self {
            command: "crytic-compile".to_string(),
        }
    }

    /// Uses a different `crytic-compile` executable.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }
}

impl Default for CryticPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuildPipeline for CryticPipeline {
    fn system(&self) -> BuildSystem {
        BuildSystem::Crytic
    }

    async fn build(&self, config: &BenchConfig) -> Result<(), BuildError> {
        info!("Building with crytic...");
        reset_output_dir(&config.build_path())?;
        run_build_command(BuildSystem::Crytic, &self.command, &["."], &config.project_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_crytic_failure_reports_system() {
        let temp = TempDir::new().unwrap();
        let config = BenchConfig::new(temp.path());

        let err = CryticPipeline::new()
            .with_command("false")
            .build(&config)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("crytic build failed"));
    }
}
