//! Flat CSV rendering of a run batch.
//!
//! Comma separated, CRLF line endings, fields quoted only when they contain
//! a comma, a quote or a line break. Missing values are empty fields.

use std::io::{self, Write};

use crate::coordinator::RunBatch;
use crate::runner::ExecutionResult;

pub const CSV_HEADER: [&str; 10] = [
    "solver",
    "solc_version",
    "name",
    "result",
    "correct",
    "t",
    "timeout",
    "memMB",
    "exit_status",
    "output",
];

/// Writes the header and one row per result, runs in batch order.
pub fn write_csv<W: Write>(writer: &mut W, batch: &RunBatch, solc_version: &str) -> io::Result<()> {
    write_row(writer, CSV_HEADER.iter().map(|h| h.to_string()))?;
    for run in &batch.runs {
        for result in &run.results {
            write_row(writer, result_fields(&run.run_id, solc_version, result))?;
        }
    }
    Ok(())
}

fn result_fields(solver: &str, solc_version: &str, result: &ExecutionResult) -> Vec<String> {
    vec![
        solver.to_string(),
        solc_version.to_string(),
        result.case.name(),
        result.outcome.to_string(),
        match result.correct() {
            Some(correct) => u8::from(correct).to_string(),
            None => String::new(),
        },
        format!("{:?}", result.elapsed_secs),
        result.timeout_secs.to_string(),
        result
            .peak_memory_mb
            .map(|mb| format!("{:?}", mb))
            .unwrap_or_default(),
        result
            .exit_status
            .map(|code| code.to_string())
            .unwrap_or_default(),
        result.diagnostics.clone(),
    ]
}

fn write_row<W: Write>(writer: &mut W, fields: impl IntoIterator<Item = String>) -> io::Result<()> {
    let line: Vec<String> = fields.into_iter().map(|f| quote(&f)).collect();
    write!(writer, "{}\r\n", line.join(","))
}

/// Quotes a field when needed, doubling embedded quotes.
pub fn quote(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
