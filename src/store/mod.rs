//! Result persistence.
//!
//! A batch is written once, at the end of a matrix run:
//!
//! ```text
//! <results_dir>/results-tstamp-<ts>.json   {run_id: [record, ...], ...}
//! <results_dir>/results-tstamp-<ts>.csv    one flat row per record
//! <results_dir>/results-latest.{json,csv}  copies of the above
//! ```
//!
//! Each file is written to a temporary sibling and renamed into place.

pub mod csv;
pub mod record;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::info;

pub use record::{ResultRecord, ResultRow};

use crate::config::BenchConfig;
use crate::coordinator::RunBatch;
use crate::error::StoreError;

/// Base name of the copies refreshed after every batch.
pub const LATEST_STEM: &str = "results-latest";

/// Paths written by [`ResultStore::write_batch`].
#[derive(Debug, Clone)]
pub struct WrittenResults {
    pub json: PathBuf,
    pub csv: PathBuf,
}

/// JSON and CSV result files in one directory.
pub struct ResultStore {
    dir: PathBuf,
    solc_version: String,
}

impl ResultStore {
    pub fn new(config: &BenchConfig) -> Self {
        Self {
            dir: config.results_dir.clone(),
            solc_version: config.solc_version.clone(),
        }
    }

    /// `results-tstamp-<timestamp>`.
    pub fn stem(timestamp: &str) -> String {
        format!("results-tstamp-{}", timestamp)
    }

    /// Writes the batch as JSON and CSV, then refreshes the `results-latest` copies.
    pub fn write_batch(&self, batch: &RunBatch) -> Result<WrittenResults, StoreError> {
        fs::create_dir_all(&self.dir)?;
        let stem = Self::stem(&batch.timestamp);
        let json = self.dir.join(format!("{stem}.json"));
        let csv = self.dir.join(format!("{stem}.csv"));

        write_atomically(&json, |writer| {
            let document = BatchDocument {
                batch,
                solc_version: &self.solc_version,
            };
            serde_json::to_writer_pretty(&mut *writer, &document)?;
            writer.write_all(b"\n")?;
            Ok(())
        })?;
        write_atomically(&csv, |writer| {
            csv::write_csv(writer, batch, &self.solc_version)?;
            Ok(())
        })?;

        fs::copy(&json, self.dir.join(format!("{LATEST_STEM}.json")))?;
        fs::copy(&csv, self.dir.join(format!("{LATEST_STEM}.csv")))?;
        info!("Generated file {}", csv.display());
        info!("Generated file {}", json.display());

        Ok(WrittenResults { json, csv })
    }

    /// Loads one or more JSON result files into flat rows.
    pub fn load(paths: &[PathBuf]) -> Result<Vec<ResultRow>, StoreError> {
        let mut rows = Vec::new();
        for path in paths {
            if !path.is_file() {
                return Err(StoreError::NotFound(path.clone()));
            }
            let text = fs::read_to_string(path)?;
            let runs: BTreeMap<String, Vec<ResultRecord>> = serde_json::from_str(&text)?;
            for (solver, records) in &runs {
                rows.extend(records.iter().map(|r| ResultRow::from_record(solver, r)));
            }
            info!("Loaded {} runs from {}", runs.len(), path.display());
        }
        Ok(rows)
    }
}

/// Serialises a batch as `{run_id: [record, ...]}` in run order.
struct BatchDocument<'a> {
    batch: &'a RunBatch,
    solc_version: &'a str,
}

impl Serialize for BatchDocument<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.batch.runs.len()))?;
        for run in &self.batch.runs {
            let records: Vec<ResultRecord> = run
                .results
                .iter()
                .map(|r| ResultRecord::from_result(r, self.solc_version))
                .collect();
            map.serialize_entry(&run.run_id, &records)?;
        }
        map.end()
    }
}

fn write_atomically<F>(path: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), StoreError>,
{
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut writer = BufWriter::new(File::create(&tmp)?);
    write(&mut writer)?;
    writer.flush()?;
    drop(writer);
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Case;
    use crate::coordinator::ToolRun;
    use crate::runner::{ExecutionResult, Outcome};
    use tempfile::TempDir;

    fn result(contract: &str, outcome: Outcome, t: f64) -> ExecutionResult {
        ExecutionResult {
            case: Case::new("src/unsafe/1tx-abstract/Foo.sol", contract, None).unwrap(),
            outcome,
            elapsed_secs: t,
            peak_memory_mb: Some(10.0),
            cpu_percent: Some(95),
            exit_status: Some(0),
            diagnostics: String::new(),
            timeout_secs: 25,
        }
    }

    fn batch() -> RunBatch {
        let mut batch = RunBatch::new("2024-03-01-10:15");
        for tool in ["zeta", "alpha"] {
            batch.runs.push(ToolRun {
                run_id: format!("{tool}-1.0-tstamp-2024-03-01-10:15"),
                tool: tool.to_string(),
                version: "1.0".to_string(),
                results: vec![
                    result("Foo", Outcome::Unsafe, 1.25),
                    result("Bar", Outcome::Unknown, 25.5),
                ],
            });
        }
        batch
    }

    #[test]
    fn test_write_batch_files() {
        let temp = TempDir::new().unwrap();
        let config = BenchConfig::new(temp.path()).with_results_dir(temp.path().join("results"));
        let written = ResultStore::new(&config).write_batch(&batch()).unwrap();

        assert_eq!(
            written.json,
            temp.path().join("results/results-tstamp-2024-03-01-10:15.json")
        );
        assert!(written.csv.is_file());
        let latest = temp.path().join("results/results-latest.json");
        assert_eq!(
            fs::read_to_string(&latest).unwrap(),
            fs::read_to_string(&written.json).unwrap()
        );
        assert!(temp.path().join("results/results-latest.csv").is_file());
        assert!(!temp
            .path()
            .join("results/results-tstamp-2024-03-01-10:15.json.tmp")
            .exists());
    }

    #[test]
    fn test_write_batch_keeps_run_order() {
        let temp = TempDir::new().unwrap();
        let config = BenchConfig::new(temp.path()).with_results_dir(temp.path());
        let written = ResultStore::new(&config).write_batch(&batch()).unwrap();

        let text = fs::read_to_string(&written.json).unwrap();
        let zeta = text.find("zeta-1.0").unwrap();
        let alpha = text.find("alpha-1.0").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn test_load_round_trips_rows() {
        let temp = TempDir::new().unwrap();
        let config = BenchConfig::new(temp.path()).with_results_dir(temp.path());
        let written = ResultStore::new(&config).write_batch(&batch()).unwrap();

        let rows = ResultStore::load(&[written.json]).unwrap();
        assert_eq!(rows.len(), 4);
        let bar = rows
            .iter()
            .find(|r| r.solver.starts_with("alpha") && r.name.ends_with(":Bar"))
            .unwrap();
        assert!(!bar.solved);
        assert_eq!(bar.tout, 25);
        assert_eq!(bar.time_or_timeout(), 25.0);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = ResultStore::load(&[temp.path().join("nope.json")]).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_load_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "[1, 2]").unwrap();
        let err = ResultStore::load(&[path]).unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }
}
