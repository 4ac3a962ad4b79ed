//! Infrastructure layer for AnyFilter.
//!
//! Contains the adapters that touch the outside world: the JSON history
//! files, the system clock, and the CLI settings file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `anyfilter_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`storage`** – `ConfigStore`, the file-backed `ConfigRepository`.
//! - **`clock`** – `Clock` trait, `SystemClock`, and `MockClock` for tests.
//! - **`settings`** – optional TOML file with CLI defaults.

pub mod clock;
pub mod settings;
pub mod storage;
