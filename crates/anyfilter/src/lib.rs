//! anyfilter library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! ```text
//! anyfilter
//!   ├── application/     ConfiguredFilter: load, edit, save, apply
//!   └── infrastructure/
//!         ├── storage/   ConfigStore: one JSON history file per filter
//!         ├── clock/     wall-clock source for snapshot timestamps
//!         └── settings/  optional TOML settings for the CLI
//! ```
//!
//! **Dependency rule**: `application` talks to storage only through the
//! [`application::configure_filter::ConfigRepository`] trait.

pub mod application;
pub mod infrastructure;

pub use application::configure_filter::{ConfigRepository, ConfigureFilterError, ConfiguredFilter};
pub use infrastructure::storage::config_store::{ConfigStore, StoreError, StoreSettings};
