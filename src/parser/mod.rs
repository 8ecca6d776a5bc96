//! Outcome and telemetry extraction from tool and wrapper output.
//!
//! Everything here is line-oriented scraping of free-form text:
//!
//! - tool stdout: `result: safe|unsafe|unknown`, last match wins
//! - limiter report: `[runlim] status: ... out of time`
//! - `time --verbose` report: peak RSS, CPU percentage, exit status
//!
//! Nothing in this module fails. A missing or malformed line only makes the
//! corresponding field absent, and the outcome falls back to `unknown`.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::catalog::Case;
use crate::runner::{ExecutionResult, Outcome, RawExecution};

static RESULT_LINE: OnceLock<Regex> = OnceLock::new();
static LIMITER_TIMEOUT: OnceLock<Regex> = OnceLock::new();
static MAX_RSS: OnceLock<Regex> = OnceLock::new();
static CPU_PERCENT: OnceLock<Regex> = OnceLock::new();
static EXIT_STATUS: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static pattern compiles"))
}

fn result_line() -> &'static Regex {
    pattern(&RESULT_LINE, r"^result: (.*)$")
}

fn limiter_timeout() -> &'static Regex {
    pattern(&LIMITER_TIMEOUT, r"^.runlim. status:.*out of time")
}

fn max_rss() -> &'static Regex {
    pattern(&MAX_RSS, r"^Maximum resident set size .kbytes.: (.*)")
}

fn cpu_percent() -> &'static Regex {
    pattern(&CPU_PERCENT, r"^Percent of CPU this job got: (.*)%")
}

fn exit_status() -> &'static Regex {
    pattern(&EXIT_STATUS, r"^Exit status:[ ]*(.*)[ ]*$")
}

/// Fields of a `time --verbose` report. Each is independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeReport {
    pub exit_status: Option<i32>,
    pub peak_memory_kb: Option<u64>,
    pub cpu_percent: Option<u32>,
}

/// Returns the token of the last `result: <token>` line in `stdout`.
pub fn find_result_token(stdout: &str) -> Option<&str> {
    stdout
        .lines()
        .filter_map(|line| result_line().captures(line.trim()))
        .filter_map(|caps| caps.get(1))
        .last()
        .map(|m| m.as_str())
}

/// True when the limiter report records an out-of-time kill.
pub fn limiter_timed_out(report: &str) -> bool {
    report.lines().any(|line| limiter_timeout().is_match(line))
}

/// Extracts memory, CPU and exit status from a `time --verbose` report.
pub fn parse_time_report(report: &str) -> TimeReport {
    let mut parsed = TimeReport::default();
    for line in report.lines() {
        let line = line.trim();
        if let Some(value) = capture(max_rss(), line) {
            parsed.peak_memory_kb = parse_field("peak memory", value);
        } else if let Some(value) = capture(cpu_percent(), line) {
            parsed.cpu_percent = parse_field("cpu percent", value);
        } else if let Some(value) = capture(exit_status(), line) {
            parsed.exit_status = parse_field("exit status", value);
        }
    }
    parsed
}

fn capture<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
    re.captures(line).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str) -> Option<T> {
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        debug!("Unparseable {} in time report: {:?}", field, value);
    }
    parsed
}

/// Turns a raw execution into a classified [`ExecutionResult`].
pub struct ResultParser;

impl ResultParser {
    /// Classifies `raw` for `case`.
    ///
    /// A limiter timeout forces `unknown` even when the tool printed a
    /// verdict. Without a timeout, a missing or unrecognised result line
    /// also yields `unknown`.
    pub fn parse(raw: &RawExecution, case: &Case, timeout_secs: u64) -> ExecutionResult {
        let token = find_result_token(&raw.stdout);
        let outcome = if raw.timed_out {
            if let Some(token) = token {
                debug!(case = %case.name(), "Ignoring 'result: {}' printed before timeout", token);
            }
            Outcome::Unknown
        } else {
            match token {
                None => {
                    debug!(case = %case.name(), "No result line in tool output");
                    Outcome::Unknown
                }
                Some(token) => Outcome::from_token(token).unwrap_or_else(|| {
                    warn!(case = %case.name(), "Unrecognised result token {:?}", token);
                    Outcome::Unknown
                }),
            }
        };

        let elapsed_secs = raw.elapsed.as_secs_f64();
        if !raw.timed_out && elapsed_secs > timeout_secs as f64 {
            warn!(
                case = %case.name(),
                "Took {:.2}s against a {}s limit but the limiter reported no timeout",
                elapsed_secs,
                timeout_secs
            );
        }

        ExecutionResult {
            case: case.clone(),
            outcome,
            elapsed_secs,
            peak_memory_mb: raw.peak_memory_kb.map(|kb| kb as f64 / 1000.0),
            cpu_percent: raw.cpu_percent,
            exit_status: raw.exit_status,
            diagnostics: raw.stderr.clone(),
            timeout_secs,
        }
    }
}
