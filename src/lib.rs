//! guardsh: run shell-style commands without a shell.
//!
//! A command is validated against a restrictive allow-list of syntax, expanded
//! (`~`, `$NAME`, globs) by a restricted evaluator, and launched directly as a process.

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;

pub use crate::core::runner::{
    CommandRunner, OutputStreams, PreparedCommand, execute, interactive,
};
pub use crate::models::{ExecutionResult, RunnerOptions, SyntaxPolicy};
pub use crate::system::executor::{ErrorKind, ExecutionError};
