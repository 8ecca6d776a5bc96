//! Resource-limited execution of verification tools.
//!
//! # Architecture
//!
//! ```text
//! time --verbose -o <time report>
//!   runlim --real-time-limit=T --output-file=<limiter report> --kill-delay=K
//!     <tool> <source-file> <contract> <function-or-empty> <0|1> [extra...]
//! ```
//!
//! The runner:
//! 1. Claims two unique scratch files for the wrapper reports
//! 2. Spawns the wrapped tool in the project directory
//! 3. Reads the reports into a [`RawExecution`]
//! 4. Removes the scratch files
//!
//! Classifying the raw execution is the parser's job.

pub mod config;
pub mod executor;
pub mod result;
pub mod scratch;

pub use config::LimiterConfig;
pub use executor::{CaseRunner, ResourceLimitedRunner};
pub use result::{ExecutionResult, Outcome, RawExecution};
pub use scratch::{ScratchFile, MAX_SCRATCH_ATTEMPTS};
