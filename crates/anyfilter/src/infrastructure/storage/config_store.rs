//! JSON-file persistence of filter configuration histories.
//!
//! Each filter instance owns one file inside the configured directory:
//!
//! ```text
//! $FILTER_CONFIG_DIR/
//! ├── NameFilter_foo.json     # history of NameFilter instance "foo"
//! └── NameFilter_bar.json
//! ```
//!
//! The file holds the instance's whole [`ConfigHistory`] as a JSON array.
//! Saving appends one snapshot and rewrites the file; nothing is ever removed.
//!
//! # Tolerant reads
//!
//! A missing, blank, or malformed file reads as an empty history.  Malformed
//! files are logged at `warn` and are replaced by a fresh history on the next
//! save that changes the configuration.
//!
//! # Known restriction: single writer
//!
//! Saves are a read-modify-write of the whole file with a direct, non-atomic
//! overwrite and no locking.  Two processes saving the same instance at the
//! same time race; the later write wins and the earlier snapshot is lost.  A
//! crash mid-write can leave a truncated file, which then reads as corrupt.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyfilter_core::{
    ConfigHistory, ConfigMap, ConfigSnapshot, FilterKind, HistoryParseError, IdentifierError,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::configure_filter::ConfigRepository;
use crate::infrastructure::clock::{Clock, SystemClock};

/// Fatal setup problems: the store cannot know where a history file lives.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// No configuration directory was supplied.
    #[error("filter config directory is not set")]
    DirectoryUnset,

    /// The supplied path does not name an existing directory.
    #[error("filter config directory {path} is not a directory")]
    NotADirectory { path: PathBuf },

    /// The filter kind or uid cannot be used in a file name.
    #[error("invalid filter identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),
}

/// Error type for configuration store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A file system I/O error occurred while saving.
    #[error("I/O error accessing config history at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The history could not be serialized to JSON.
    #[error("failed to serialize config history: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where the store keeps its files.
///
/// Built by the caller (the CLI fills it from `--config-dir` or
/// `FILTER_CONFIG_DIR`); the store itself never reads the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSettings {
    pub config_dir: Option<PathBuf>,
}

impl StoreSettings {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: Some(config_dir.into()),
        }
    }
}

/// Builds the history file path for instance `uid` of `kind`.
///
/// # Errors
///
/// Returns [`ConfigurationError::DirectoryUnset`] if `base_dir` is `None`,
/// [`ConfigurationError::NotADirectory`] if it does not name an existing
/// directory, and [`ConfigurationError::InvalidIdentifier`] for an unusable
/// kind or uid.
pub fn resolve(
    kind: &FilterKind,
    uid: &str,
    base_dir: Option<&Path>,
) -> Result<PathBuf, ConfigurationError> {
    let dir = validate_dir(base_dir)?;
    Ok(dir.join(kind.file_name(uid)?))
}

fn validate_dir(base_dir: Option<&Path>) -> Result<&Path, ConfigurationError> {
    let dir = base_dir
        .filter(|d| !d.as_os_str().is_empty())
        .ok_or(ConfigurationError::DirectoryUnset)?;
    if !dir.is_dir() {
        return Err(ConfigurationError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    Ok(dir)
}

/// File-backed store of configuration histories.
#[derive(Debug, Clone)]
pub struct ConfigStore<C = SystemClock> {
    base_dir: PathBuf,
    clock: C,
}

impl ConfigStore<SystemClock> {
    /// Opens the store described by `settings`, stamping snapshots with the
    /// system clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the directory is unset or invalid.
    pub fn open(settings: &StoreSettings) -> Result<Self, ConfigurationError> {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> ConfigStore<C> {
    /// Opens the store with a caller-supplied clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the directory is unset or invalid.
    pub fn with_clock(settings: &StoreSettings, clock: C) -> Result<Self, ConfigurationError> {
        let base_dir = validate_dir(settings.config_dir.as_deref())?.to_path_buf();
        debug!(dir = %base_dir.display(), "opened filter config store");
        Ok(Self { base_dir, clock })
    }

    /// The validated directory holding the history files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// History file path for instance `uid` of `kind`.
    ///
    /// # Errors
    ///
    /// See [`resolve`]; the directory is re-checked on every call.
    pub fn resolve(&self, kind: &FilterKind, uid: &str) -> Result<PathBuf, ConfigurationError> {
        resolve(kind, uid, Some(self.base_dir.as_path()))
    }

    /// Reads the full history at `path`, treating a missing, blank, unreadable
    /// or malformed file as an empty history.
    pub fn load_history(&self, path: &Path) -> ConfigHistory {
        match read_history(path) {
            Ok(history) => history,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config history; using empty history");
                ConfigHistory::new()
            }
        }
    }

    /// The active configuration at `path` (see [`ConfigHistory::active_config`]).
    pub fn load_active(&self, path: &Path) -> ConfigMap {
        self.load_history(path).active_config()
    }

    /// Appends `config` as a new snapshot by `user`, unless it equals the
    /// active configuration already on disk.
    ///
    /// Returns `true` if a snapshot was written and `false` for a no-op, in
    /// which case the file is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if an existing file cannot be read (the
    /// store will not overwrite history it could not load) or if the write
    /// fails, and [`StoreError::Serialize`] if serialization fails.
    pub fn save(&self, path: &Path, config: &ConfigMap, user: &str) -> Result<bool, StoreError> {
        let mut history = read_history(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if history.active_config() == *config {
            debug!(path = %path.display(), "configuration unchanged; nothing to save");
            return Ok(false);
        }

        history.push(ConfigSnapshot::new(self.clock.now(), user, config.clone()));
        let content = history.to_json()?;
        fs::write(path, content).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            path = %path.display(),
            user,
            snapshots = history.len(),
            "saved configuration snapshot"
        );
        Ok(true)
    }
}

impl<C: Clock> ConfigRepository for ConfigStore<C> {
    type Error = StoreError;

    fn history(&self, kind: &FilterKind, uid: &str) -> Result<ConfigHistory, StoreError> {
        let path = self.resolve(kind, uid)?;
        Ok(self.load_history(&path))
    }

    fn save_config(
        &self,
        kind: &FilterKind,
        uid: &str,
        config: &ConfigMap,
        user: &str,
    ) -> Result<bool, StoreError> {
        let path = self.resolve(kind, uid)?;
        self.save(&path, config, user)
    }
}

/// Reads and parses the history file.
///
/// Absence and corrupt content are recovered here; only I/O failures on an
/// existing file are returned.
fn read_history(path: &Path) -> io::Result<ConfigHistory> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ConfigHistory::new()),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            warn!(path = %path.display(), "config history is not UTF-8; treating as empty");
            return Ok(ConfigHistory::new());
        }
        Err(e) => return Err(e),
    };

    match ConfigHistory::parse(&raw) {
        Ok(history) => Ok(history),
        Err(HistoryParseError::Empty) => {
            debug!(path = %path.display(), "config history file is empty");
            Ok(ConfigHistory::new())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config history is corrupt; treating as empty");
            Ok(ConfigHistory::new())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
