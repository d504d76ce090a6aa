// src/cli.rs

//! Command-line arguments of the `guardsh` binary.

use crate::models::{RunnerOptions, SyntaxPolicy};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// guardsh: run a shell-style command without a shell.
///
/// The command is checked against a restrictive allow-list of syntax (no `;`, `&`,
/// `$(...)`, backticks, redirections, pipes or test brackets), `~` and `$NAME` are
/// expanded, and the result is launched directly as a process.
///
/// Examples:
///   - `guardsh echo $HOME`
///   - `guardsh -- ls -l ~/projects`
///   - `guardsh --interactive ssh user@host`
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Do not print the captured stdout. Without this flag, stdout is printed unless the
    /// options file sets `echo_stdout = false`.
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the expanded command, tokens and raw output to stderr.
    #[arg(short, long)]
    pub trace: bool,

    /// Attach the command to this terminal instead of capturing its output.
    #[arg(short, long)]
    pub interactive: bool,

    /// Only reject a trailing `&` and allow `=` with a warning.
    #[arg(long)]
    pub lenient: bool,

    /// Hide special-character warnings.
    #[arg(long)]
    pub no_warnings: bool,

    /// Directory to run the command in.
    #[arg(short = 'C', long)]
    pub cwd: Option<PathBuf>,

    /// Options file to use instead of the default location.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// The command to run. Words are joined with single spaces.
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(OsString)
    )]
    pub command: Vec<OsString>,
}

impl Cli {
    /// Layers the command-line flags on top of options loaded from file.
    pub fn apply_to(&self, mut options: RunnerOptions) -> RunnerOptions {
        let echo = !self.quiet && options.echo_stdout.unwrap_or(true);
        options.echo_stdout = Some(echo);
        if self.trace {
            options.trace = true;
        }
        if self.lenient {
            options.policy = SyntaxPolicy::Lenient;
        }
        if self.no_warnings {
            options.warnings = false;
        }
        if let Some(cwd) = &self.cwd {
            options.working_dir = Some(cwd.clone());
        }
        options
    }

    /// The command words joined back into one command line.
    pub fn command_line(&self) -> OsString {
        let mut line = OsString::new();
        for (i, word) in self.command.iter().enumerate() {
            if i > 0 {
                line.push(" ");
            }
            line.push(word);
        }
        line
    }
}
