// src/core/runner.rs

//! # Command Runner
//!
//! The pipeline that takes one command string from raw text to a finished process:
//!
//! 1. reject empty input,
//! 2. pre-expansion validation,
//! 3. expansion of `~` and `$NAME`,
//! 4. post-expansion validation,
//! 5. whitespace tokenization,
//! 6. a direct process launch through the configured [`Launcher`].
//!
//! No shell is involved at step 6, which is what makes the earlier checks meaningful.

use crate::{
    core::{
        expander::Expander,
        validator::{SyntaxWarning, Validator},
    },
    models::{ExecutionResult, RunnerOptions},
    system::executor::{self, ExecutionError, Launcher, SystemLauncher},
};
use colored::Colorize;
use std::ffi::OsStr;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// A command that passed every check and is ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommand {
    /// The command after `~`, variable and glob expansion.
    pub expanded: String,
    /// `expanded` split on whitespace; the first word is the program.
    pub argv: Vec<String>,
}

type Stream = Mutex<Box<dyn Write + Send>>;

/// Where a runner writes echoed stdout and its diagnostics (warnings and trace lines).
pub struct OutputStreams {
    stdout: Stream,
    diagnostics: Stream,
}

impl OutputStreams {
    /// The process's own stdout and stderr.
    pub fn standard() -> Self {
        Self::new(io::stdout(), io::stderr())
    }

    /// Custom sinks, e.g. in-memory buffers.
    pub fn new(
        stdout: impl Write + Send + 'static,
        diagnostics: impl Write + Send + 'static,
    ) -> Self {
        Self {
            stdout: Mutex::new(Box::new(stdout)),
            diagnostics: Mutex::new(Box::new(diagnostics)),
        }
    }

    fn echo(&self, text: &str) {
        write_line(&self.stdout, text);
    }

    fn diagnostic(&self, line: &str) {
        write_line(&self.diagnostics, line);
    }
}

impl Default for OutputStreams {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for OutputStreams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStreams").finish_non_exhaustive()
    }
}

fn write_line(stream: &Stream, line: &str) {
    let mut stream = stream.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = writeln!(stream, "{}", line).and_then(|()| stream.flush()) {
        log::debug!("Could not write runner output: {}", e);
    }
}

/// Runs commands through the guarded pipeline with one fixed set of options.
#[derive(Debug)]
pub struct CommandRunner<L: Launcher = SystemLauncher> {
    options: RunnerOptions,
    validator: Validator,
    launcher: L,
    output: OutputStreams,
}

impl CommandRunner<SystemLauncher> {
    /// A runner that launches real processes and writes to stdout/stderr.
    pub fn new(options: RunnerOptions) -> Self {
        Self::with_launcher(options, SystemLauncher)
    }
}

impl<L: Launcher> CommandRunner<L> {
    /// A runner that hands prepared commands to `launcher`.
    pub fn with_launcher(options: RunnerOptions, launcher: L) -> Self {
        let validator = Validator::new(options.policy);
        Self {
            options,
            validator,
            launcher,
            output: OutputStreams::standard(),
        }
    }

    /// Replaces the streams used for echoed stdout, warnings and trace lines.
    pub fn with_output(mut self, output: OutputStreams) -> Self {
        self.output = output;
        self
    }

    /// The options this runner was built with.
    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// The launcher commands are handed to.
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Validates, expands and tokenizes `command` without launching anything.
    pub fn prepare(&self, command: &str) -> Result<PreparedCommand, ExecutionError> {
        let trimmed = command.trim();
        if trimmed.is_empty() {
            return Err(ExecutionError::EmptyCommand);
        }
        if trimmed.contains('\0') {
            return Err(ExecutionError::InvalidInputType(
                trimmed.escape_debug().to_string(),
            ));
        }

        let warnings = self.validator.pre_expansion(trimmed)?;
        self.report_warnings(trimmed, &warnings);

        let expander = Expander::new(&self.options.env, self.options.working_dir.as_deref());
        let expanded = expander.expand(trimmed)?;
        self.trace("expanded", &expanded);

        self.validator.post_expansion(&expanded)?;

        let argv = executor::tokenize(&expanded)?;
        self.trace("tokens", &format!("{:?}", argv));

        Ok(PreparedCommand { expanded, argv })
    }

    /// Runs `command` with captured output and returns the full result.
    pub fn run(&self, command: &str) -> Result<ExecutionResult, ExecutionError> {
        let prepared = self.prepare(command)?;
        let result = executor::capture(
            &self.launcher,
            &prepared.argv,
            self.options.working_dir.as_deref(),
            &self.options.env,
            command.trim(),
        );

        match &result {
            Ok(output) => {
                self.trace("stdout", &output.stdout);
                self.trace("stderr", &output.stderr);
            }
            Err(e) => self.trace("error", &e.to_string()),
        }

        let output = result?;
        if self.options.echoes_stdout() && !output.stdout.is_empty() {
            self.output.echo(&output.stdout);
        }
        Ok(output)
    }

    /// Runs `command` and returns its trimmed stdout.
    pub fn execute(&self, command: &str) -> Result<String, ExecutionError> {
        self.run(command).map(|result| result.stdout)
    }

    /// Like [`CommandRunner::execute`], for input that may not be valid Unicode.
    pub fn execute_os(&self, command: &OsStr) -> Result<String, ExecutionError> {
        self.execute(as_command_str(command)?)
    }

    /// Runs `command` with the caller's terminal attached instead of capturing output.
    pub fn interactive(&self, command: &str) -> Result<(), ExecutionError> {
        let prepared = self.prepare(command)?;
        log::debug!("Running interactively: {:?}", prepared.argv);
        executor::interactive(
            &self.launcher,
            &prepared.argv,
            self.options.working_dir.as_deref(),
            &self.options.env,
            command.trim(),
        )
    }

    /// Like [`CommandRunner::interactive`], for input that may not be valid Unicode.
    pub fn interactive_os(&self, command: &OsStr) -> Result<(), ExecutionError> {
        self.interactive(as_command_str(command)?)
    }

    fn report_warnings(&self, command: &str, warnings: &[SyntaxWarning]) {
        for warning in warnings {
            log::warn!("{}: {}", command, warning);
            if self.options.warnings {
                self.output
                    .diagnostic(&format!("{} {}", "warning:".yellow().bold(), warning));
            }
        }
    }

    fn trace(&self, label: &str, value: &str) {
        if self.options.trace {
            self.output
                .diagnostic(&format!("{} {}: {}", "[trace]".dimmed(), label, value));
        } else {
            log::trace!("{}: {}", label, value);
        }
    }
}

fn as_command_str(command: &OsStr) -> Result<&str, ExecutionError> {
    command
        .to_str()
        .ok_or_else(|| ExecutionError::InvalidInputType(command.to_string_lossy().into_owned()))
}

/// Runs `command` once with a fresh runner built from `options`.
pub fn execute(command: &str, options: &RunnerOptions) -> Result<String, ExecutionError> {
    CommandRunner::new(options.clone()).execute(command)
}

/// Runs `command` once with stdio attached, using a fresh runner built from `options`.
pub fn interactive(command: &str, options: &RunnerOptions) -> Result<(), ExecutionError> {
    CommandRunner::new(options.clone()).interactive(command)
}
