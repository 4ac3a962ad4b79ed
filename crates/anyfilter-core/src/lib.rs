//! # anyfilter-core
//!
//! Shared library for AnyFilter containing the configuration snapshot model,
//! the filter contract, and the HTML form parser that turns posted key/value
//! rows into a configuration mapping.
//!
//! This crate performs no file-system access.  Loading and persisting
//! snapshots lives in the `anyfilter` crate's storage infrastructure.
//!
//! # Architecture overview
//!
//! A *filter* transforms a sequence of records (string-keyed JSON objects).
//! Its behaviour is steered by a small string→string configuration mapping
//! that users edit over time.  Every edit is kept as a timestamped snapshot
//! so earlier configurations remain inspectable:
//!
//! - **`domain::snapshot`** – `ConfigSnapshot` and `ConfigHistory`, plus the
//!   rule that picks the *active* configuration out of a history.
//! - **`domain::filter`** – the `Filter` trait and the reference
//!   `NameFilter` that renames record keys.
//! - **`domain::form`** – parsing of `"{kind}_key{n}"` / `"{kind}_val{n}"`
//!   form fields into a configuration mapping.
//! - **`domain::kind`** – `FilterKind`, the explicit name under which a
//!   filter's snapshots and form fields are namespaced.

pub mod domain;

pub use domain::filter::{Filter, NameFilter, Record};
pub use domain::form::{config_from_form_data, FormData};
pub use domain::kind::{validate_uid, FilterKind, IdentifierError};
pub use domain::snapshot::{
    ConfigHistory, ConfigMap, ConfigSnapshot, HistoryParseError, CREATED_DATE_FORMAT,
};
