//! Application layer use cases.
//!
//! Use cases in this layer orchestrate domain objects from `anyfilter_core`
//! and depend on storage only through traits, so they can be exercised with
//! an in-memory repository.
//!
//! # Sub-modules
//!
//! - **`configure_filter`** – `ConfiguredFilter`: opens a filter instance,
//!   loads its active configuration, applies edits (directly or from a
//!   posted form), saves new snapshots, and runs the filter over records.

pub mod configure_filter;
