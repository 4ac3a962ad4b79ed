//! TOML settings for the `anyfilter` command-line tool.
//!
//! The settings file is optional and only supplies defaults; command-line
//! flags and environment variables take precedence.  Example:
//!
//! ```toml
//! config_dir = "/var/lib/anyfilter"
//! default_user = "ops"
//! log_level = "debug"
//! ```
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when absent, so a partial file (or none at all) is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A file system I/O error occurred.
    #[error("I/O error reading settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Defaults for the command-line tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliSettings {
    /// Directory holding the history files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_dir: Option<PathBuf>,
    /// User recorded on snapshots when `--user` is not given.
    #[serde(default = "default_user")]
    pub default_user: String,
    /// `tracing` log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_user() -> String {
    "anonymous".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            config_dir: None,
            default_user: default_user(),
            log_level: default_log_level(),
        }
    }
}

/// Loads settings from `path`, returning `CliSettings::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system errors other than "not
/// found", and [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_settings(path: &Path) -> Result<CliSettings, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CliSettings::default()),
        Err(e) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
