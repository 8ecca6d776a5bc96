//! Command-line interface for symbench.
//!
//! Provides the `run`, `cases` and `graphs` commands.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli, Commands};
