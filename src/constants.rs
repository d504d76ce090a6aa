// src/constants.rs

//! Names and literals shared across modules.

/// The name of the directory holding guardsh configuration (inside the system config dir).
pub const APP_DIR: &str = "guardsh";

/// The name of the options file (inside the app config dir).
pub const CONFIG_FILENAME: &str = "config.toml";

/// Environment variable that points at an alternative options file.
pub const CONFIG_ENV_VAR: &str = "GUARDSH_CONFIG";

/// The variable consulted for `~` expansion before falling back to the OS lookup.
pub const HOME_VAR: &str = "HOME";

/// Separator used when rejoining independently expanded pipe segments.
pub const PIPE_SEPARATOR: &str = " | ";
