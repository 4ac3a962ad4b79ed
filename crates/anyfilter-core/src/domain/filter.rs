//! The filter contract and the reference key-renaming filter.
//!
//! A [`Filter`] receives a batch of [`Record`]s together with the filter's
//! active configuration and returns the transformed batch.  Filters hold no
//! configuration of their own; loading and saving the configuration is the
//! job of the surrounding `ConfiguredFilter` in the `anyfilter` crate.
//!
//! Plain functions and closures with the right signature are filters too:
//!
//! ```rust
//! use anyfilter_core::{ConfigMap, Filter, Record};
//!
//! let drop_empty = |records: Vec<Record>, _: &ConfigMap| {
//!     records.into_iter().filter(|r| !r.is_empty()).collect::<Vec<_>>()
//! };
//! assert!(drop_empty.apply(vec![Record::new()], &ConfigMap::new()).is_empty());
//! ```

use super::snapshot::ConfigMap;

/// One record flowing through a filter: a JSON object.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A transformation over a batch of records, parameterised by configuration.
pub trait Filter {
    fn apply(&self, records: Vec<Record>, config: &ConfigMap) -> Vec<Record>;
}

impl<F> Filter for F
where
    F: Fn(Vec<Record>, &ConfigMap) -> Vec<Record>,
{
    fn apply(&self, records: Vec<Record>, config: &ConfigMap) -> Vec<Record> {
        self(records, config)
    }
}

/// Renames record keys.
///
/// Each configuration entry `from → to` moves the value stored under `from`
/// to `to`, overwriting anything already at `to`.  Entries are applied one at
/// a time in configuration key order, each to the record as left by the
/// previous one, so renames chain: with `{a → b, b → c}` the record
/// `{"a": 1, "b": 2}` becomes `{"c": 1}`.  Records without a matching key
/// pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameFilter;

impl NameFilter {
    /// Kind name under which NameFilter configurations are stored.
    pub const KIND: &'static str = "NameFilter";
}

impl Filter for NameFilter {
    fn apply(&self, mut records: Vec<Record>, config: &ConfigMap) -> Vec<Record> {
        for record in &mut records {
            for (from, to) in config {
                if let Some(value) = record.remove(from) {
                    record.insert(to.clone(), value);
                }
            }
        }
        records
    }
}
