//! Cases and their path-derived classification.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Ground truth for a case, taken from its directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedOutcome {
    /// Under `src/safe/`: no assertion can be violated.
    Safe,
    /// Under `src/unsafe/`: some assertion can be violated.
    Unsafe,
}

impl ExpectedOutcome {
    /// Classifies a source file by its outcome directory.
    pub fn classify(source_file: &str) -> Result<Self, CatalogError> {
        let path = Path::new(source_file);
        if path.starts_with("src/safe") {
            Ok(Self::Safe)
        } else if path.starts_with("src/unsafe") {
            Ok(Self::Unsafe)
        } else {
            Err(CatalogError::UnclassifiedOutcome(source_file.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Unsafe => "unsafe",
        }
    }
}

impl std::fmt::Display for ExpectedOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a case targets one `prove*` function or a whole contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// ds-test style: each `prove*` function is its own case.
    UnitFunction,
    /// 1tx-abstract style: the contract is the case.
    WholeContract,
}

impl ExecutionMode {
    /// Directory name under `src/{safe,unsafe}/` for unit-function cases.
    pub const UNIT_FUNCTION_DIR: &'static str = "ds-test";
    /// Directory name under `src/{safe,unsafe}/` for whole-contract cases.
    pub const WHOLE_CONTRACT_DIR: &'static str = "1tx-abstract";

    /// Classifies a source file by its execution-mode directory.
    pub fn classify(source_file: &str) -> Result<Self, CatalogError> {
        let path = Path::new(source_file);
        let under = |dir: &str| {
            ["src/safe", "src/unsafe"]
                .iter()
                .any(|root| path.starts_with(Path::new(root).join(dir)))
        };
        if under(Self::UNIT_FUNCTION_DIR) {
            Ok(Self::UnitFunction)
        } else if under(Self::WHOLE_CONTRACT_DIR) {
            Ok(Self::WholeContract)
        } else {
            Err(CatalogError::UnclassifiedMode(source_file.to_string()))
        }
    }

    /// The `0|1` flag passed to tools.
    pub fn flag(&self) -> u8 {
        match self {
            Self::UnitFunction => 1,
            Self::WholeContract => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnitFunction => "unit-function",
            Self::WholeContract => "whole-contract",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One unit of verification work. Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Contract name.
    pub contract: String,
    /// Build artifact the case was discovered from.
    pub artifact_path: PathBuf,
    /// Solidity source path, relative to the project root.
    pub source_file: String,
    /// Execution mode, derived from `source_file`.
    pub mode: ExecutionMode,
    /// Target function (unit-function mode only).
    pub function: Option<String>,
    /// Ground truth, derived from `source_file`.
    pub expected: ExpectedOutcome,
}

impl Case {
    /// Creates a case, classifying it from its source path.
    ///
    /// `function` is dropped for whole-contract cases.
    pub fn new(
        source_file: impl Into<String>,
        contract: impl Into<String>,
        function: Option<String>,
    ) -> Result<Self, CatalogError> {
        let source_file = source_file.into();
        let expected = ExpectedOutcome::classify(&source_file)?;
        let mode = ExecutionMode::classify(&source_file)?;
        let function = match mode {
            ExecutionMode::UnitFunction => function,
            ExecutionMode::WholeContract => None,
        };
        Ok(Self {
            contract: contract.into(),
            artifact_path: PathBuf::new(),
            source_file,
            mode,
            function,
            expected,
        })
    }

    /// Records the artifact this case came from.
    pub fn with_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    /// Instance name used to join results across tools.
    pub fn name(&self) -> String {
        match self.mode {
            ExecutionMode::UnitFunction => format!(
                "{}:{}:{}",
                self.source_file,
                self.contract,
                self.function_arg()
            ),
            ExecutionMode::WholeContract => format!("{}:{}", self.source_file, self.contract),
        }
    }

    /// Function argument for the tool command line (empty for whole-contract).
    pub fn function_arg(&self) -> &str {
        self.function.as_deref().unwrap_or("")
    }

    pub fn is_unit_function(&self) -> bool {
        self.mode == ExecutionMode::UnitFunction
    }
}

impl std::fmt::Display for Case {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Contract: {}, ", self.contract)?;
        if let Some(function) = &self.function {
            write!(f, "Function: {}, ", function)?;
        }
        write!(
            f,
            "Artifact: {}, Mode: {}, Expected result: {}",
            self.artifact_path.display(),
            self.mode,
            self.expected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_outcome_classification() {
        assert_eq!(
            ExpectedOutcome::classify("src/safe/ds-test/A.sol").unwrap(),
            ExpectedOutcome::Safe
        );
        assert_eq!(
            ExpectedOutcome::classify("src/unsafe/1tx-abstract/B.sol").unwrap(),
            ExpectedOutcome::Unsafe
        );
        assert!(matches!(
            ExpectedOutcome::classify("src/other/C.sol"),
            Err(CatalogError::UnclassifiedOutcome(_))
        ));
    }

    #[test]
    fn test_expected_outcome_is_component_wise() {
        // "src/safer" is not under "src/safe"
        assert!(ExpectedOutcome::classify("src/safer/ds-test/A.sol").is_err());
    }

    #[test]
    fn test_execution_mode_classification() {
        assert_eq!(
            ExecutionMode::classify("src/unsafe/ds-test/A.sol").unwrap(),
            ExecutionMode::UnitFunction
        );
        assert_eq!(
            ExecutionMode::classify("src/safe/1tx-abstract/A.sol").unwrap(),
            ExecutionMode::WholeContract
        );
        assert!(matches!(
            ExecutionMode::classify("src/safe/misc/A.sol"),
            Err(CatalogError::UnclassifiedMode(_))
        ));
    }

    #[test]
    fn test_mode_flag() {
        assert_eq!(ExecutionMode::UnitFunction.flag(), 1);
        assert_eq!(ExecutionMode::WholeContract.flag(), 0);
    }

    #[test]
    fn test_whole_contract_case_name() {
        let case = Case::new("src/unsafe/1tx-abstract/Foo.sol", "Foo", None).unwrap();
        assert_eq!(case.name(), "src/unsafe/1tx-abstract/Foo.sol:Foo");
        assert_eq!(case.expected, ExpectedOutcome::Unsafe);
        assert_eq!(case.function_arg(), "");
        assert!(!case.is_unit_function());
    }

    #[test]
    fn test_unit_function_case_name() {
        let case = Case::new(
            "src/safe/ds-test/Bar.sol",
            "BarTest",
            Some("prove_add".to_string()),
        )
        .unwrap();
        assert_eq!(case.name(), "src/safe/ds-test/Bar.sol:BarTest:prove_add");
        assert_eq!(case.expected, ExpectedOutcome::Safe);
        assert_eq!(case.mode.flag(), 1);
    }

    #[test]
    fn test_whole_contract_drops_function() {
        let case = Case::new(
            "src/safe/1tx-abstract/Foo.sol",
            "Foo",
            Some("prove_x".to_string()),
        )
        .unwrap();
        assert!(case.function.is_none());
    }

    #[test]
    fn test_display() {
        let case = Case::new("src/safe/ds-test/Bar.sol", "BarTest", Some("prove_a".into()))
            .unwrap()
            .with_artifact("out/Bar.sol/BarTest.json");
        let shown = case.to_string();
        assert!(shown.contains("Function: prove_a"));
        assert!(shown.contains("out/Bar.sol/BarTest.json"));
        assert!(shown.ends_with("Expected result: safe"));
    }
}
