//! Storage infrastructure: configuration history persistence.
//!
//! The `config_store` sub-module handles:
//!
//! - Validating the externally supplied configuration directory.
//! - Mapping a (filter kind, uid) pair to its history file.
//! - Reading histories, recovering from missing or corrupt files.
//! - Appending a snapshot and rewriting the file when a configuration changes.

pub mod config_store;
