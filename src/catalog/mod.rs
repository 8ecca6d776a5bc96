//! Case discovery from forge build output.
//!
//! The catalog reads `<build>/<Source.sol>/<Contract>.json` artifacts and
//! turns each into one or more [`Case`]s:
//!
//! ```text
//! src/{safe,unsafe}/ds-test/X.sol      → one case per `prove*` function
//! src/{safe,unsafe}/1tx-abstract/X.sol → one case per contract
//! src/common/**, lib/**                → skipped (shared fixtures)
//! anything else                        → CatalogError
//! ```
//!
//! The catalog never compiles; the build pipeline must have run first.

pub mod artifact;
pub mod case;

use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use walkdir::WalkDir;

pub use artifact::{ForgeArtifact, PROVE_PREFIX};
pub use case::{Case, ExecutionMode, ExpectedOutcome};

use crate::config::BenchConfig;
use crate::error::CatalogError;

/// Build-output directory holding compiler metadata, not contracts.
const BUILD_INFO_DIR: &str = "build-info";

/// Source prefixes that are never test subjects.
const EXCLUDED_PREFIXES: &[&str] = &["src/common", "lib"];

/// Discovers cases from already-built artifacts.
pub struct CaseCatalog {
    build_root: PathBuf,
}

impl CaseCatalog {
    /// Creates a catalog over the configured build output directory.
    pub fn new(config: &BenchConfig) -> Self {
        Self {
            build_root: config.build_path(),
        }
    }

    /// Creates a catalog over an explicit build output directory.
    pub fn at(build_root: impl Into<PathBuf>) -> Self {
        Self {
            build_root: build_root.into(),
        }
    }

    /// Discovers all cases, ordered by artifact path.
    pub fn discover(&self) -> Result<Vec<Case>, CatalogError> {
        if !self.build_root.is_dir() {
            return Err(CatalogError::MissingBuildDir(self.build_root.clone()));
        }

        let mut cases = Vec::new();
        for artifact_path in self.artifact_paths()? {
            let artifact = ForgeArtifact::load(&artifact_path)?;
            let source_file = artifact.source_file();
            if is_excluded(source_file) {
                debug!(artifact = %artifact_path.display(), "Skipping shared artifact");
                continue;
            }

            let contract = contract_name(&artifact_path)?;
            ExpectedOutcome::classify(source_file)?;
            match ExecutionMode::classify(source_file)? {
                ExecutionMode::UnitFunction => {
                    for function in artifact.prove_functions() {
                        cases.push(
                            Case::new(source_file, contract.clone(), Some(function))?
                                .with_artifact(&artifact_path),
                        );
                    }
                }
                ExecutionMode::WholeContract => {
                    cases.push(
                        Case::new(source_file, contract, None)?.with_artifact(&artifact_path),
                    );
                }
            }
        }

        info!(
            "Discovered {} cases in {}",
            cases.len(),
            self.build_root.display()
        );
        Ok(cases)
    }

    /// Lists `<build>/<dir>/<Contract>.json`, skipping `build-info`.
    fn artifact_paths(&self) -> Result<Vec<PathBuf>, CatalogError> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.build_root)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let in_build_info = path
                .parent()
                .and_then(Path::file_name)
                .is_some_and(|dir| dir == BUILD_INFO_DIR);
            if !in_build_info {
                paths.push(path.to_path_buf());
            }
        }
        Ok(paths)
    }
}

/// True for sources under a shared/library prefix.
pub fn is_excluded(source_file: &str) -> bool {
    let path = Path::new(source_file);
    EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

fn contract_name(artifact_path: &Path) -> Result<String, CatalogError> {
    artifact_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .ok_or_else(|| CatalogError::MalformedArtifact {
            path: artifact_path.to_path_buf(),
            reason: "artifact has no file name".to_string(),
        })
}

/// Shuffles `cases` with a seeded RNG. The same seed always yields the same order.
pub fn shuffle_cases(mut cases: Vec<Case>, seed: u64) -> Vec<Case> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    cases.shuffle(&mut rng);
    cases
}
