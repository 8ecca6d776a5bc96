//! symbench: benchmark harness for symbolic-execution and SMT verification tools.
//!
//! This library discovers verification cases from build artifacts, runs each
//! configured tool on them under resource limits, classifies the verdicts
//! against the expected outcome, persists the results, and aggregates them
//! into comparative tables.

pub mod aggregate;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod parser;
pub mod runner;
pub mod store;
pub mod tools;

// Re-export commonly used error types
pub use config::ConfigError;
pub use error::{
    AggregateError, BuildError, CatalogError, CoordinatorError, RunnerError, StoreError,
};
