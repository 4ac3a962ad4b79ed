//! ConfigureFilterUseCase: a filter bound to its persisted configuration.
//!
//! A [`ConfiguredFilter`] is one named instance of a filter kind, e.g. the
//! `NameFilter` instance `"foo"`.  Opening it loads the instance's active
//! configuration from a [`ConfigRepository`]; callers may then edit the
//! in-memory copy and save it back, which appends a snapshot only if the
//! configuration actually changed.
//!
//! ```text
//! open ──► config() / set_config() / update_config(form) ──► save_config(user)
//!                         │
//!                         ▼
//!                  apply(records)
//! ```

use anyfilter_core::{
    config_from_form_data, validate_uid, ConfigHistory, ConfigMap, Filter, FilterKind, FormData,
    IdentifierError, Record,
};
use thiserror::Error;
use tracing::debug;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for configured-filter operations.
#[derive(Debug, Error)]
pub enum ConfigureFilterError {
    #[error("invalid filter identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("failed to load configuration: {0}")]
    LoadFailed(#[source] BoxError),

    #[error("failed to persist configuration: {0}")]
    PersistFailed(#[source] BoxError),
}

/// Persistence of configuration histories, keyed by filter kind and uid.
///
/// Implementations absorb missing or corrupt data into an empty history;
/// errors are reserved for problems the caller must act on (bad setup,
/// failed writes).
pub trait ConfigRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The full history of instance `uid` of `kind`.
    fn history(&self, kind: &FilterKind, uid: &str) -> Result<ConfigHistory, Self::Error>;

    /// Appends `config` unless it equals the active configuration.
    /// Returns whether a snapshot was written.
    fn save_config(
        &self,
        kind: &FilterKind,
        uid: &str,
        config: &ConfigMap,
        user: &str,
    ) -> Result<bool, Self::Error>;
}

impl<R: ConfigRepository + ?Sized> ConfigRepository for &R {
    type Error = R::Error;

    fn history(&self, kind: &FilterKind, uid: &str) -> Result<ConfigHistory, Self::Error> {
        (**self).history(kind, uid)
    }

    fn save_config(
        &self,
        kind: &FilterKind,
        uid: &str,
        config: &ConfigMap,
        user: &str,
    ) -> Result<bool, Self::Error> {
        (**self).save_config(kind, uid, config, user)
    }
}

/// A filter instance together with its configuration lifecycle.
#[derive(Debug)]
pub struct ConfiguredFilter<F, R> {
    kind: FilterKind,
    uid: String,
    filter: F,
    repository: R,
    config: ConfigMap,
}

impl<F: Filter, R: ConfigRepository> ConfiguredFilter<F, R> {
    /// Opens instance `uid` of `kind` and loads its active configuration.
    ///
    /// A missing or corrupt history yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigureFilterError::InvalidIdentifier`] for an unusable
    /// uid and [`ConfigureFilterError::LoadFailed`] if the repository cannot
    /// locate the history at all.
    pub fn open(
        repository: R,
        kind: FilterKind,
        uid: impl Into<String>,
        filter: F,
    ) -> Result<Self, ConfigureFilterError> {
        let uid = uid.into();
        validate_uid(&uid)?;

        let config = repository
            .history(&kind, &uid)
            .map_err(|e| ConfigureFilterError::LoadFailed(Box::new(e)))?
            .active_config();
        debug!(kind = %kind, uid = %uid, entries = config.len(), "opened filter");

        Ok(Self {
            kind,
            uid,
            filter,
            repository,
            config,
        })
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// The in-memory configuration, including unsaved edits.
    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigMap {
        &mut self.config
    }

    /// Replaces the in-memory configuration.  Nothing is persisted until
    /// [`save_config`](Self::save_config).
    pub fn set_config(&mut self, config: ConfigMap) {
        self.config = config;
    }

    /// Every saved snapshot of this instance, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigureFilterError::LoadFailed`] if the repository cannot
    /// locate the history.
    pub fn history(&self) -> Result<ConfigHistory, ConfigureFilterError> {
        self.repository
            .history(&self.kind, &self.uid)
            .map_err(|e| ConfigureFilterError::LoadFailed(Box::new(e)))
    }

    /// Discards unsaved edits by reloading the active configuration.
    ///
    /// # Errors
    ///
    /// See [`history`](Self::history).
    pub fn reload(&mut self) -> Result<(), ConfigureFilterError> {
        self.config = self.history()?.active_config();
        Ok(())
    }

    /// Saves the in-memory configuration as `user`.
    ///
    /// Returns `false` without writing when it equals the active
    /// configuration on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigureFilterError::PersistFailed`] if the repository
    /// cannot write.
    pub fn save_config(&self, user: &str) -> Result<bool, ConfigureFilterError> {
        self.repository
            .save_config(&self.kind, &self.uid, &self.config, user)
            .map_err(|e| ConfigureFilterError::PersistFailed(Box::new(e)))
    }

    /// Replaces the configuration with the rows posted in `form` and saves it
    /// as `user`.
    ///
    /// # Errors
    ///
    /// See [`save_config`](Self::save_config).
    pub fn update_config(&mut self, form: &FormData, user: &str) -> Result<bool, ConfigureFilterError> {
        self.config = config_from_form_data(form, &self.kind);
        self.save_config(user)
    }

    /// Runs the filter over `records` with the in-memory configuration.
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        self.filter.apply(records, &self.config)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
