// src/core/expander.rs

//! # Expander
//!
//! Turns `~`, `$NAME` and `${NAME}` references into literal text without handing the
//! command to a shell. Only word splitting, quote removal, variable lookup and filename
//! globbing are performed; nothing the user typed is ever executed here.

use crate::constants::{HOME_VAR, PIPE_SEPARATOR};
use glob::MatchOptions;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::env::{self, VarError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while turning a command into literal text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpansionError {
    /// `~` was used and no home directory is known.
    #[error("Could not determine the home directory for '~' expansion.")]
    HomeNotFound,
    /// A quote was opened and never closed in the given segment.
    #[error("Malformed quoting in '{0}'.")]
    MalformedQuoting(String),
    /// A variable exists but its value could not be used (e.g. it is not valid Unicode).
    #[error("Variable '${name}' could not be expanded: {reason}")]
    Lookup {
        /// The variable name, without `$`.
        name: String,
        /// Why the lookup failed.
        reason: String,
    },
}

lazy_static! {
    /// `$NAME` or `${NAME}` with nothing else inside the braces.
    static ref PLAIN_REFERENCE: Regex =
        Regex::new(r"\$(?:\{([A-Za-z0-9_]+)\}|([A-Za-z0-9_]+))").expect("valid reference regex");
}

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Expands commands against a set of variable overrides and an optional working directory.
#[derive(Debug, Clone, Copy)]
pub struct Expander<'a> {
    overrides: &'a HashMap<String, String>,
    working_dir: Option<&'a Path>,
}

impl<'a> Expander<'a> {
    /// `overrides` win over the process environment; globs resolve against `working_dir`.
    pub fn new(overrides: &'a HashMap<String, String>, working_dir: Option<&'a Path>) -> Self {
        Self {
            overrides,
            working_dir,
        }
    }

    /// Expands a validated command into fully literal text.
    ///
    /// Pipe segments are expanded independently and rejoined with `" | "`, so the pipe
    /// structure is still visible to the post-expansion check.
    pub fn expand(&self, command: &str) -> Result<String, ExpansionError> {
        let command = if command.contains('~') {
            command.replace('~', &self.home_dir()?)
        } else {
            command.to_string()
        };

        let segments = command
            .split('|')
            .map(|segment| self.expand_segment(segment))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(segments.join(PIPE_SEPARATOR))
    }

    /// The echo-style evaluation of one segment: split into words, expand each word,
    /// and join the results with single spaces.
    fn expand_segment(&self, segment: &str) -> Result<String, ExpansionError> {
        let words = shlex::split(segment)
            .ok_or_else(|| ExpansionError::MalformedQuoting(segment.trim().to_string()))?;

        let mut expanded = Vec::with_capacity(words.len());
        for word in &words {
            let word = self.blank_unset(word);
            let value = shellexpand::env_with_context(&word, |name| self.lookup(name)).map_err(
                |e| ExpansionError::Lookup {
                    name: e.var_name.clone(),
                    reason: e.cause.to_string(),
                },
            )?;
            expanded.extend(self.expand_glob(&value));
        }

        // An unset variable expands to nothing and must not leave a stray separator behind.
        expanded.retain(|w| !w.is_empty());
        Ok(expanded.join(" "))
    }

    /// Removes plain references to unset variables. `shellexpand` keeps those verbatim,
    /// while `${NAME:-default}` needs the unset case reported as `None` to pick its default.
    fn blank_unset(&self, word: &str) -> String {
        PLAIN_REFERENCE
            .replace_all(word, |caps: &Captures<'_>| {
                let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
                if self.is_set(name) {
                    caps.get(0).map_or("", |m| m.as_str()).to_string()
                } else {
                    String::new()
                }
            })
            .into_owned()
    }

    fn is_set(&self, name: &str) -> bool {
        self.overrides.contains_key(name) || env::var_os(name).is_some()
    }

    fn lookup(&self, name: &str) -> Result<Option<String>, VarError> {
        if let Some(value) = self.overrides.get(name) {
            return Ok(Some(value.clone()));
        }
        match env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn home_dir(&self) -> Result<String, ExpansionError> {
        if let Some(home) = self.overrides.get(HOME_VAR) {
            return Ok(home.clone());
        }
        dirs::home_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .ok_or(ExpansionError::HomeNotFound)
    }

    /// Expands `*` and `?` against the filesystem. A pattern without matches stays literal.
    fn expand_glob(&self, word: &str) -> Vec<String> {
        if !word.contains(['*', '?']) {
            return vec![word.to_string()];
        }

        let base = match self.working_dir {
            Some(dir) if Path::new(word).is_relative() => Some(dir),
            _ => None,
        };
        let pattern = match base {
            Some(dir) => dir.join(word).to_string_lossy().into_owned(),
            None => word.to_string(),
        };

        let matches: Vec<String> = match glob::glob_with(&pattern, GLOB_OPTIONS) {
            Ok(paths) => paths
                .filter_map(Result::ok)
                .map(|path| relative_to(path, base))
                .collect(),
            Err(e) => {
                log::debug!("Ignoring invalid glob pattern '{}': {}", word, e);
                Vec::new()
            }
        };

        if matches.is_empty() {
            vec![word.to_string()]
        } else {
            matches
        }
    }
}

fn relative_to(path: PathBuf, base: Option<&Path>) -> String {
    let path = match base {
        Some(dir) => path
            .strip_prefix(dir)
            .map(Path::to_path_buf)
            .unwrap_or(path),
        None => path,
    };
    path.to_string_lossy().into_owned()
}
