//! Forge build artifacts (`out/<Source.sol>/<Contract>.json`).

use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;

/// Prefix that marks a function as a unit-function case.
pub const PROVE_PREFIX: &str = "prove";

/// The parts of a forge artifact the catalog reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ForgeArtifact {
    #[serde(default)]
    pub abi: Vec<AbiEntry>,
    pub ast: AstHeader,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbiEntry {
    /// Absent for constructors, fallback and receive entries.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AstHeader {
    #[serde(rename = "absolutePath")]
    pub absolute_path: String,
}

impl ForgeArtifact {
    /// Reads and parses an artifact file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| CatalogError::MalformedArtifact {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Source file the contract was compiled from.
    pub fn source_file(&self) -> &str {
        &self.ast.absolute_path
    }

    /// Names of ABI entries starting with [`PROVE_PREFIX`], in ABI order.
    pub fn prove_functions(&self) -> Vec<String> {
        self.abi
            .iter()
            .filter_map(|entry| entry.name.as_deref())
            .filter(|name| name.starts_with(PROVE_PREFIX))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ForgeArtifact {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_prove_functions_filters_by_prefix() {
        let artifact = parse(
            r#"{
                "abi": [
                    {"type": "constructor", "inputs": []},
                    {"type": "function", "name": "prove_transfer"},
                    {"type": "function", "name": "setUp"},
                    {"type": "function", "name": "proveOverflow"},
                    {"type": "function", "name": "Prove_upper"},
                    {"type": "function", "name": "test_prove"}
                ],
                "ast": {"absolutePath": "src/safe/ds-test/Token.sol"}
            }"#,
        );
        assert_eq!(
            artifact.prove_functions(),
            vec!["prove_transfer".to_string(), "proveOverflow".to_string()]
        );
        assert_eq!(artifact.source_file(), "src/safe/ds-test/Token.sol");
    }

    #[test]
    fn test_missing_abi_defaults_to_empty() {
        let artifact = parse(r#"{"ast": {"absolutePath": "src/safe/1tx-abstract/A.sol"}}"#);
        assert!(artifact.prove_functions().is_empty());
    }

    #[test]
    fn test_load_reports_malformed_artifact() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("A.json");
        std::fs::write(&path, r#"{"abi": []}"#).unwrap();
        assert!(matches!(
            ForgeArtifact::load(&path),
            Err(CatalogError::MalformedArtifact { .. })
        ));
    }
}
