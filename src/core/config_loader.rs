//! # Config Loader
//!
//! Locates and parses the runner options file. Lookup order:
//!
//! 1. an explicit path (e.g. `--config`),
//! 2. the path in `$GUARDSH_CONFIG`,
//! 3. `<config dir>/guardsh/config.toml`.
//!
//! Only the implicit default location is allowed to be missing; in that case the
//! built-in defaults are used.

use crate::{
    constants::{APP_DIR, CONFIG_ENV_VAR, CONFIG_FILENAME},
    models::RunnerOptions,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while locating or parsing the options file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The platform has no notion of a per-user config directory.
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    /// The file could not be read.
    #[error("Could not read config file '{path}': {source}")]
    Io {
        /// The file that was being read.
        path: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or does not match [`RunnerOptions`].
    #[error("Failed to parse '{path}': {source}")]
    TomlParse {
        /// The file that was being parsed.
        path: String,
        /// The parser's diagnostic.
        #[source]
        source: toml::de::Error,
    },
}

/// Returns the default options file path (`~/.config/guardsh/config.toml` on Linux).
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
        .ok_or(ConfigError::ConfigDirNotFound)
}

/// Loads runner options following the lookup order described in the module docs.
pub fn load_options(explicit: Option<&Path>) -> Result<RunnerOptions, ConfigError> {
    if let Some(path) = explicit {
        return load_options_from(path);
    }
    if let Some(path) = env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        return load_options_from(Path::new(&path));
    }

    let path = match default_config_path() {
        Ok(path) => path,
        Err(e) => {
            log::debug!("{} Using default options.", e);
            return Ok(RunnerOptions::default());
        }
    };
    if !path.exists() {
        log::debug!(
            "No config file at '{}'. Using default options.",
            path.display()
        );
        return Ok(RunnerOptions::default());
    }
    load_options_from(&path)
}

/// Parses the options file at `path`. The file must exist.
pub fn load_options_from(path: &Path) -> Result<RunnerOptions, ConfigError> {
    log::debug!("Loading options from '{}'", path.display());
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SyntaxPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_options_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "echo_stdout = true\npolicy = \"lenient\"\nworking_dir = \"/tmp\"\n\n[env]\nHOME = \"/home/kim\"\n"
        )
        .unwrap();
        file.flush().unwrap();

        let options = load_options(Some(file.path())).unwrap();
        assert_eq!(options.echo_stdout, Some(true));
        assert!(!options.trace);
        assert_eq!(options.policy, SyntaxPolicy::Lenient);
        assert_eq!(options.working_dir, Some(PathBuf::from("/tmp")));
        assert_eq!(options.env.get("HOME").map(String::as_str), Some("/home/kim"));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = load_options(Some(Path::new("/guardsh/no/such/config.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"policy = \"paranoid\"\n").unwrap();
        file.flush().unwrap();

        let err = load_options_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_default_path_ends_with_app_file() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with(Path::new(APP_DIR).join(CONFIG_FILENAME)));
        }
    }
}
