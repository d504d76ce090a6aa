// src/core/mod.rs

//! # Core Pipeline
//!
//! Everything between the raw command string and the launch: validation, expansion,
//! the runner that sequences them, and the options file.

/// Locating and parsing the options file.
pub mod config_loader;
/// `~`, variable and glob expansion.
pub mod expander;
/// The end-to-end pipeline and its public entry points.
pub mod runner;
/// The disallowed-syntax rules.
pub mod validator;
