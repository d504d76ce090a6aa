// src/system/executor.rs

//! # Executor
//!
//! The last stage of the pipeline: whitespace tokenization and a direct process launch
//! through a [`Launcher`]. Also home of [`ExecutionError`], the one error type the public
//! API returns.

use crate::core::{expander::ExpansionError, validator::SyntaxViolation};
use crate::models::ExecutionResult;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use thiserror::Error;

/// Everything that can go wrong between receiving a command and its process exiting.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The input cannot be a command line: it is not valid Unicode or contains a NUL byte.
    #[error("Input is not a valid command string: {0}")]
    InvalidInputType(String),
    /// A syntax rule rejected the command, before or after expansion.
    #[error(transparent)]
    UnsupportedSyntax(#[from] SyntaxViolation),
    /// `~` or a variable could not be expanded.
    #[error("Expansion failed: {0}")]
    Expansion(#[from] ExpansionError),
    /// The input, or its expansion, has no words.
    #[error("No command specified to run.")]
    EmptyCommand,
    /// The OS error from the failed spawn, surfaced as-is.
    #[error(transparent)]
    ExecutableNotFound(io::Error),
    /// The process ran and exited with a non-zero status.
    #[error("Command '{command}' exited with status {code}: {detail}")]
    NonZeroExit {
        /// The exit status, `128 + signal` for signal deaths on Unix.
        code: i32,
        /// The trimmed command line as the caller wrote it.
        command: String,
        /// Trimmed stderr, else trimmed stdout, else `exit status N`.
        detail: String,
    },
    /// The captured stdout or stderr was not valid UTF-8.
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        /// The trimmed command line as the caller wrote it.
        command: String,
        /// The decoding error.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// The failure categories callers and tests match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`ExecutionError::InvalidInputType`].
    InvalidInputType,
    /// See [`ExecutionError::UnsupportedSyntax`].
    UnsupportedSyntax,
    /// See [`ExecutionError::Expansion`].
    ExpansionError,
    /// See [`ExecutionError::EmptyCommand`].
    EmptyCommand,
    /// See [`ExecutionError::ExecutableNotFound`].
    ExecutableNotFound,
    /// See [`ExecutionError::NonZeroExit`].
    NonZeroExit,
    /// See [`ExecutionError::InvalidUtf8Output`].
    InvalidOutput,
}

impl ExecutionError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInputType(_) => ErrorKind::InvalidInputType,
            Self::UnsupportedSyntax(_) => ErrorKind::UnsupportedSyntax,
            Self::Expansion(_) => ErrorKind::ExpansionError,
            Self::EmptyCommand => ErrorKind::EmptyCommand,
            Self::ExecutableNotFound(_) => ErrorKind::ExecutableNotFound,
            Self::NonZeroExit { .. } => ErrorKind::NonZeroExit,
            Self::InvalidUtf8Output { .. } => ErrorKind::InvalidOutput,
        }
    }

    /// The exit code the process returned, if this is a `NonZeroExit`.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Everything needed to start one process. `args` never contains the program itself.
#[derive(Debug, Clone, Copy)]
pub struct LaunchRequest<'a> {
    /// The executable, resolved through `PATH` by the launcher.
    pub program: &'a str,
    /// Arguments after the program name.
    pub args: &'a [String],
    /// Working directory, or the caller's when `None`.
    pub cwd: Option<&'a Path>,
    /// Variables added to the inherited environment.
    pub env: &'a HashMap<String, String>,
}

/// Raw, unprocessed output of a captured run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Bytes written to stdout.
    pub stdout: Vec<u8>,
    /// Bytes written to stderr.
    pub stderr: Vec<u8>,
    /// Exit code as computed by the launcher.
    pub code: i32,
}

/// The process-spawn facility. Implementations must launch `program` directly with
/// `args` as its argument vector; they must never route the request through a shell.
pub trait Launcher {
    /// Runs to completion with stdout and stderr captured.
    fn capture(&self, request: &LaunchRequest<'_>) -> io::Result<CapturedOutput>;

    /// Runs to completion with stdio inherited from the caller. Returns the exit code.
    fn inherit(&self, request: &LaunchRequest<'_>) -> io::Result<i32>;
}

/// The real launcher, backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl SystemLauncher {
    fn command(request: &LaunchRequest<'_>) -> StdCommand {
        let mut command = StdCommand::new(request.program);
        command.args(request.args).envs(request.env);
        if let Some(cwd) = request.cwd {
            command.current_dir(dunce::simplified(cwd));
        }
        command
    }
}

impl Launcher for SystemLauncher {
    fn capture(&self, request: &LaunchRequest<'_>) -> io::Result<CapturedOutput> {
        let output = Self::command(request)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        Ok(CapturedOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            code: exit_code(output.status),
        })
    }

    fn inherit(&self, request: &LaunchRequest<'_>) -> io::Result<i32> {
        let status = Self::command(request)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        Ok(exit_code(status))
    }
}

/// Maps an exit status to a single integer. Signal deaths follow the shell
/// convention of `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Splits an expanded command on whitespace. No quoting is honoured at this stage.
pub fn tokenize(expanded: &str) -> Result<Vec<String>, ExecutionError> {
    let tokens: Vec<String> = expanded.split_whitespace().map(str::to_string).collect();
    if tokens.is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }
    Ok(tokens)
}

/// Launches `argv` with captured output and turns the raw result into an `ExecutionResult`.
///
/// `command_line` is only used for error messages.
pub fn capture<L: Launcher + ?Sized>(
    launcher: &L,
    argv: &[String],
    cwd: Option<&Path>,
    env: &HashMap<String, String>,
    command_line: &str,
) -> Result<ExecutionResult, ExecutionError> {
    let (program, args) = argv.split_first().ok_or(ExecutionError::EmptyCommand)?;
    let request = LaunchRequest {
        program,
        args,
        cwd,
        env,
    };

    let output = launcher
        .capture(&request)
        .map_err(|e| spawn_error(program, e))?;

    let stdout = decode(output.stdout, command_line)?;
    let stderr = decode(output.stderr, command_line)?;
    let result = ExecutionResult {
        stdout: stdout.trim().to_string(),
        stderr: stderr.trim().to_string(),
        status: output.code,
    };

    if !result.success() {
        let detail = if !result.stderr.is_empty() {
            result.stderr.clone()
        } else if !result.stdout.is_empty() {
            result.stdout.clone()
        } else {
            format!("exit status {}", result.status)
        };
        return Err(ExecutionError::NonZeroExit {
            code: result.status,
            command: command_line.to_string(),
            detail,
        });
    }

    Ok(result)
}

/// Launches `argv` with the caller's stdio attached. Nothing is captured.
pub fn interactive<L: Launcher + ?Sized>(
    launcher: &L,
    argv: &[String],
    cwd: Option<&Path>,
    env: &HashMap<String, String>,
    command_line: &str,
) -> Result<(), ExecutionError> {
    let (program, args) = argv.split_first().ok_or(ExecutionError::EmptyCommand)?;
    let request = LaunchRequest {
        program,
        args,
        cwd,
        env,
    };

    let code = launcher
        .inherit(&request)
        .map_err(|e| spawn_error(program, e))?;
    if code != 0 {
        return Err(ExecutionError::NonZeroExit {
            code,
            command: command_line.to_string(),
            detail: format!("exit status {}", code),
        });
    }
    Ok(())
}

/// `std::process` reports a NUL byte in the program, an argument or the environment as
/// `InvalidInput`; that is bad input, not a missing executable.
fn spawn_error(program: &str, error: io::Error) -> ExecutionError {
    log::debug!("Spawning '{}' failed: {}", program, error);
    if error.kind() == io::ErrorKind::InvalidInput {
        return ExecutionError::InvalidInputType(error.to_string());
    }
    ExecutionError::ExecutableNotFound(error)
}

fn decode(bytes: Vec<u8>, command_line: &str) -> Result<String, ExecutionError> {
    String::from_utf8(bytes).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: command_line.to_string(),
        source: e,
    })
}
