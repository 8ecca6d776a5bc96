//! Per-instance best-time table.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::AggregateError;
use crate::store::ResultRow;

/// One line of the best-time table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceRow {
    /// 1-based position in the table.
    pub index: usize,
    pub name: String,
    /// Plot label derived from `name`.
    pub label: String,
    /// One time per solver, in [`BestTimeTable::solvers`] order.
    pub times: Vec<f64>,
}

/// Wide table of instance x solver times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestTimeTable {
    pub solvers: Vec<String>,
    pub rows: Vec<InstanceRow>,
}

/// Basename of the case name with underscores escaped for the plotting sink.
pub fn instance_label(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    base.replace('_', r"\\\_")
}

/// Builds the table over sorted instances and sorted `solvers`.
///
/// Every solver must have a row for every instance. Duplicate rows for a
/// solver and instance keep the smaller time.
pub fn best_time_table(
    solvers: &[String],
    rows: &[ResultRow],
) -> Result<BestTimeTable, AggregateError> {
    let mut by_instance: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for row in rows {
        let time = row.time_or_timeout().min(row.tout as f64);
        by_instance
            .entry(row.name.as_str())
            .or_default()
            .entry(row.solver.as_str())
            .and_modify(|best| *best = best.min(time))
            .or_insert(time);
    }

    let mut table_rows = Vec::with_capacity(by_instance.len());
    for (i, (name, times)) in by_instance.iter().enumerate() {
        let mut row_times = Vec::with_capacity(solvers.len());
        for solver in solvers {
            let time = times.get(solver.as_str()).ok_or_else(|| {
                AggregateError::MissingResult {
                    solver: solver.clone(),
                    instance: name.to_string(),
                }
            })?;
            row_times.push(*time);
        }
        table_rows.push(InstanceRow {
            index: i + 1,
            name: name.to_string(),
            label: instance_label(name),
            times: row_times,
        });
    }

    Ok(BestTimeTable {
        solvers: solvers.to_vec(),
        rows: table_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(solver: &str, name: &str, solved: bool, t: f64) -> ResultRow {
        ResultRow {
            solver: solver.to_string(),
            name: name.to_string(),
            solved,
            t,
            tout: 25,
        }
    }

    fn solvers() -> Vec<String> {
        vec!["a".to_string(), "b".to_string()]
    }

    #[test]
    fn test_best_time_uses_timeout_for_unsolved() {
        let rows = vec![
            row("a", "src/unsafe/1tx-abstract/Foo.sol:Foo", true, 3.2),
            row("b", "src/unsafe/1tx-abstract/Foo.sol:Foo", false, 26.1),
        ];
        let table = best_time_table(&solvers(), &rows).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].index, 1);
        assert_eq!(table.rows[0].times, vec![3.2, 25.0]);
        assert_eq!(table.rows[0].label, "Foo.sol:Foo");
    }

    #[test]
    fn test_best_time_caps_solved_time_at_timeout() {
        let rows = vec![row("a", "x.sol:X", true, 25.3), row("b", "x.sol:X", true, 1.0)];
        let table = best_time_table(&solvers(), &rows).unwrap();
        assert_eq!(table.rows[0].times, vec![25.0, 1.0]);
    }

    #[test]
    fn test_best_time_missing_solver_is_error() {
        let rows = vec![
            row("a", "x.sol:X", true, 1.0),
            row("b", "x.sol:X", true, 1.0),
            row("a", "y.sol:Y", true, 1.0),
        ];
        let err = best_time_table(&solvers(), &rows).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::MissingResult { ref solver, ref instance }
                if solver == "b" && instance == "y.sol:Y"
        ));
    }

    #[test]
    fn test_best_time_rows_sorted_by_instance() {
        let rows = vec![
            row("a", "z.sol:Z", true, 1.0),
            row("b", "z.sol:Z", true, 2.0),
            row("a", "m.sol:M", true, 3.0),
            row("b", "m.sol:M", true, 4.0),
        ];
        let table = best_time_table(&solvers(), &rows).unwrap();
        let names: Vec<&str> = table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["m.sol:M", "z.sol:Z"]);
        assert_eq!(table.rows[1].index, 2);
    }

    #[test]
    fn test_instance_label_escapes_underscores() {
        assert_eq!(
            instance_label("src/safe/ds-test/A.sol:ATest:prove_a_b"),
            r"A.sol:ATest:prove\\\_a\\\_b"
        );
    }
}
