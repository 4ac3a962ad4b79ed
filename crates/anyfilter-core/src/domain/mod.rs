//! Domain types for AnyFilter.
//!
//! Everything in this module is pure: no file I/O, no environment reads, no
//! clocks.  Timestamps are handed in by the caller so the versioning rules
//! can be tested deterministically.

pub mod filter;
pub mod form;
pub mod kind;
pub mod snapshot;
