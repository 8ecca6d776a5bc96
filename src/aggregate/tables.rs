//! Plain-text tables for the plotting collaborator.
//!
//! ```text
//! cdf-<solver>.dat         <count> \t<time>
//! compare-<a>-<b>.dat      <timeA> <timeB> <name>
//! boxdata.dat              <index> <label> <t1> <t2> ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::comparison::Comparison;
use super::curve::AggregateCurve;
use super::instance::BestTimeTable;
use super::Aggregator;
use crate::error::AggregateError;

/// Renders a curve as `count \ttime` lines.
pub fn format_curve(curve: &AggregateCurve) -> String {
    curve
        .points
        .iter()
        .map(|p| format!("{} \t{}\n", p.solved, p.time_secs))
        .collect()
}

/// Renders a comparison as `timeA timeB name` lines.
pub fn format_comparison(comparison: &Comparison) -> String {
    comparison
        .points
        .iter()
        .map(|p| format!("{:.6} {:.6} {}\n", p.time_a, p.time_b, p.name))
        .collect()
}

/// Renders the best-time table as `index label t1 t2 ...` lines.
pub fn format_best_times(table: &BestTimeTable) -> String {
    let mut out = String::new();
    for row in &table.rows {
        out.push_str(&format!("{} {}", row.index, row.label));
        for t in &row.times {
            out.push_str(&format!(" {}", t));
        }
        out.push('\n');
    }
    out
}

/// Maps a solver id onto a file-name fragment.
///
/// Run ids embed whatever the tool's version command printed, so anything
/// outside `[A-Za-z0-9._+-]` becomes `_`.
pub fn file_stem(solver: &str) -> String {
    solver
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn write_table(path: &Path, contents: &str) -> Result<(), AggregateError> {
    fs::write(path, contents).map_err(|source| AggregateError::WriteTable {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes every table into `dir` and returns the written paths.
///
/// The best-time table is computed first so a missing result fails before
/// anything is written.
pub fn write_tables(dir: &Path, aggregator: &Aggregator) -> Result<Vec<PathBuf>, AggregateError> {
    let table = aggregator.best_time_table()?;
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for curve in aggregator.curves() {
        let path = dir.join(format!("cdf-{}.dat", file_stem(&curve.solver)));
        write_table(&path, &format_curve(&curve))?;
        info!(
            solver = %curve.solver,
            "Solved {} cases, wrote {}",
            curve.total_solved(),
            path.display()
        );
        written.push(path);
    }

    for comparison in aggregator.comparisons() {
        let path = dir.join(format!(
            "compare-{}-{}.dat",
            file_stem(&comparison.solver_a),
            file_stem(&comparison.solver_b)
        ));
        write_table(&path, &format_comparison(&comparison))?;
        info!(
            solver_a = %comparison.solver_a,
            solver_b = %comparison.solver_b,
            "Wrote {}",
            path.display()
        );
        written.push(path);
    }

    let path = dir.join("boxdata.dat");
    write_table(&path, &format_best_times(&table))?;
    info!("Wrote {}", path.display());
    written.push(path);

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::comparison::ComparisonPoint;
    use crate::aggregate::curve::CurvePoint;
    use crate::aggregate::instance::InstanceRow;
    use crate::config::BenchConfig;
    use crate::store::ResultRow;
    use tempfile::TempDir;

    #[test]
    fn test_format_curve() {
        let curve = AggregateCurve {
            solver: "a".to_string(),
            points: vec![
                CurvePoint {
                    solved: 0,
                    time_secs: 0,
                },
                CurvePoint {
                    solved: 2,
                    time_secs: 4,
                },
            ],
        };
        assert_eq!(format_curve(&curve), "0 \t0\n2 \t4\n");
    }

    #[test]
    fn test_format_comparison() {
        let comparison = Comparison {
            solver_a: "a".to_string(),
            solver_b: "b".to_string(),
            points: vec![ComparisonPoint {
                time_a: 3.2,
                time_b: 25.0,
                name: "x.sol:X".to_string(),
            }],
        };
        assert_eq!(format_comparison(&comparison), "3.200000 25.000000 x.sol:X\n");
    }

    #[test]
    fn test_format_best_times() {
        let table = BestTimeTable {
            solvers: vec!["a".to_string(), "b".to_string()],
            rows: vec![InstanceRow {
                index: 1,
                name: "x.sol:X".to_string(),
                label: "x.sol:X".to_string(),
                times: vec![3.2, 25.0],
            }],
        };
        assert_eq!(format_best_times(&table), "1 x.sol:X 3.2 25\n");
    }

    fn row(solver: &str, name: &str, solved: bool, t: f64) -> ResultRow {
        ResultRow {
            solver: solver.to_string(),
            name: name.to_string(),
            solved,
            t,
            tout: 25,
        }
    }

    #[test]
    fn test_write_tables_files() {
        let temp = TempDir::new().unwrap();
        let config = BenchConfig::new(temp.path());
        let rows = vec![
            row("a", "x.sol:X", true, 1.5),
            row("b", "x.sol:X", false, 25.2),
        ];
        let aggregator = Aggregator::new(&config, rows).unwrap();

        let written = write_tables(&temp.path().join("graphs"), &aggregator).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["cdf-a.dat", "cdf-b.dat", "compare-a-b.dat", "boxdata.dat"]);

        let cdf_a = fs::read_to_string(temp.path().join("graphs/cdf-a.dat")).unwrap();
        assert_eq!(cdf_a, "0 \t0\n1 \t2\n");
        let cdf_b = fs::read_to_string(temp.path().join("graphs/cdf-b.dat")).unwrap();
        assert_eq!(cdf_b, "0 \t0\n");
        let boxdata = fs::read_to_string(temp.path().join("graphs/boxdata.dat")).unwrap();
        assert_eq!(boxdata, "1 x.sol:X 1.5 25\n");
    }

    #[test]
    fn test_file_stem_replaces_path_characters() {
        assert_eq!(file_stem("hevm-1.0-tstamp-x"), "hevm-1.0-tstamp-x");
        assert_eq!(
            file_stem("halmos-0.1 (git a/b)-tstamp-2024-01-01-10:00"),
            "halmos-0.1__git_a_b_-tstamp-2024-01-01-10_00"
        );
        assert_eq!(file_stem("..\\x"), ".._x");
    }

    #[test]
    fn test_write_tables_with_slash_in_version() {
        let temp = TempDir::new().unwrap();
        let config = BenchConfig::new(temp.path());
        let odd = "halmos-0.1 (git a/b)-tstamp-x";
        let rows = vec![
            row(odd, "x.sol:X", true, 1.5),
            row("hevm-1.0-tstamp-x", "x.sol:X", true, 3.0),
        ];
        let aggregator = Aggregator::new(&config, rows).unwrap();

        let out = temp.path().join("graphs");
        let written = write_tables(&out, &aggregator).unwrap();
        assert_eq!(written.len(), 4);
        for path in &written {
            assert_eq!(path.parent(), Some(out.as_path()));
            assert!(path.is_file());
        }
        let cdf = fs::read_to_string(out.join("cdf-halmos-0.1__git_a_b_-tstamp-x.dat")).unwrap();
        assert_eq!(cdf, "0 \t0\n1 \t2\n");
        assert!(out
            .join("compare-halmos-0.1__git_a_b_-tstamp-x-hevm-1.0-tstamp-x.dat")
            .is_file());
    }

    #[test]
    fn test_write_table_error_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing/cdf-a.dat");
        let err = write_table(&path, "").unwrap_err();
        assert!(matches!(err, AggregateError::WriteTable { .. }));
        assert!(err.to_string().contains("missing/cdf-a.dat"));
    }

    #[test]
    fn test_write_tables_missing_result_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let config = BenchConfig::new(temp.path());
        let rows = vec![
            row("a", "x.sol:X", true, 1.5),
            row("b", "y.sol:Y", true, 2.5),
        ];
        let aggregator = Aggregator::new(&config, rows).unwrap();

        let out = temp.path().join("graphs");
        let err = write_tables(&out, &aggregator).unwrap_err();
        assert!(matches!(err, AggregateError::MissingResult { .. }));
        assert!(!out.exists());
    }
}
