// src/bin/guardsh.rs

//! The `guardsh` command-line tool.

use anyhow::Result;
use clap::Parser;
use colored::*;
use guardsh::{
    CommandRunner, ExecutionError,
    cli::Cli,
    core::config_loader,
};

/// The main entry point of the `guardsh` binary.
/// It sets up logging, parses arguments, runs the command and performs centralized
/// error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // A failing child keeps its own exit code, so `guardsh` can stand in for it in scripts.
        let exit_code = e
            .downcast_ref::<ExecutionError>()
            .and_then(ExecutionError::exit_code)
            .filter(|code| *code > 0 && *code < 256)
            .unwrap_or(1);

        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(exit_code);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let file_options = config_loader::load_options(cli.config.as_deref())?;
    let options = cli.apply_to(file_options);
    let command_line = cli.command_line();

    let runner = CommandRunner::new(options);
    if cli.interactive {
        runner.interactive_os(&command_line)?;
    } else {
        runner.execute_os(&command_line)?;
    }
    Ok(())
}
