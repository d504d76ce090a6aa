// src/models.rs

//! Configuration and result types shared by the pipeline, the config loader and the CLI.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// How strictly the pre-expansion pass treats the ambiguous rules.
///
/// `Strict` rejects every `&` and every `=`. `Lenient` only rejects a trailing `&`
/// and downgrades `=` to a warning, for callers that need inline assignments.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxPolicy {
    /// Reject any `&` and any `=`.
    #[default]
    Strict,
    /// Reject only a trailing `&`; warn on `=`.
    Lenient,
}

/// Per-runner configuration. Read once at construction and never mutated afterwards,
/// so independent runners can be used side by side without interfering.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerOptions {
    /// Write the captured stdout to the output stream after a successful run.
    ///
    /// `None` means "not configured": the library treats it as `false`, while the CLI
    /// treats it as `true` unless `--quiet` is given.
    pub echo_stdout: Option<bool>,
    /// Emit internal diagnostic lines (expanded command, tokens, raw output) to stderr.
    pub trace: bool,
    /// Print non-blocking syntax warnings to stderr.
    pub warnings: bool,
    /// Which pre-expansion rule set applies.
    pub policy: SyntaxPolicy,
    /// Directory the child process runs in. Defaults to the current directory.
    pub working_dir: Option<PathBuf>,
    /// Variables that take precedence over the process environment during
    /// expansion and are exported to the child.
    pub env: HashMap<String, String>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            echo_stdout: None,
            trace: false,
            warnings: true,
            policy: SyntaxPolicy::default(),
            working_dir: None,
            env: HashMap::new(),
        }
    }
}

impl RunnerOptions {
    /// Whether captured stdout is echoed, with an unset value meaning no.
    pub fn echoes_stdout(&self) -> bool {
        self.echo_stdout.unwrap_or(false)
    }
}

/// The outcome of one captured process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Captured stdout, trimmed of surrounding whitespace.
    pub stdout: String,
    /// Captured stderr, trimmed of surrounding whitespace.
    pub stderr: String,
    /// Exit code of the process. Signal deaths are reported as `128 + signal` on Unix.
    pub status: i32,
}

impl ExecutionResult {
    /// `true` when the process exited with status 0.
    pub fn success(&self) -> bool {
        self.status == 0
    }
}
