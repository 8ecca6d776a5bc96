//! Pairwise solver comparisons.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::ResultRow;

/// One case shared by two solvers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPoint {
    /// Solver A time, or its timeout when unsolved.
    pub time_a: f64,
    /// Solver B time, or its timeout when unsolved.
    pub time_b: f64,
    pub name: String,
}

/// Scatter data for one ordered solver pair (`solver_a < solver_b`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub solver_a: String,
    pub solver_b: String,
    pub points: Vec<ComparisonPoint>,
}

/// Joins the rows of two solvers on case name, in case-name order.
pub fn compare(solver_a: &str, solver_b: &str, rows: &[ResultRow]) -> Comparison {
    let by_name = |solver: &str| {
        let mut map: BTreeMap<&str, Vec<&ResultRow>> = BTreeMap::new();
        for row in rows.iter().filter(|r| r.solver == solver) {
            map.entry(row.name.as_str()).or_default().push(row);
        }
        map
    };
    let a_rows = by_name(solver_a);
    let b_rows = by_name(solver_b);

    let mut points = Vec::new();
    for (name, a_list) in &a_rows {
        let Some(b_list) = b_rows.get(name) else {
            continue;
        };
        for a in a_list {
            for b in b_list {
                points.push(ComparisonPoint {
                    time_a: a.time_or_timeout(),
                    time_b: b.time_or_timeout(),
                    name: name.to_string(),
                });
            }
        }
    }

    Comparison {
        solver_a: solver_a.to_string(),
        solver_b: solver_b.to_string(),
        points,
    }
}
