//! Configuration updates posted from an HTML form.
//!
//! The editing page renders one row per configuration entry, with a key input
//! and a value input named after the filter kind and the row number:
//!
//! ```text
//! NameFilter_key1 = dog      NameFilter_val1 = canine
//! NameFilter_key2 = cat      NameFilter_val2 = feline
//! ```
//!
//! [`config_from_form_data`] turns such a post back into a [`ConfigMap`].
//! Rows are matched by their number, so only rows that posted both a key
//! field and a value field are considered.  Blank rows (empty key or value
//! after trimming) are dropped silently; they are how users delete entries.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::kind::FilterKind;
use super::snapshot::ConfigMap;

/// Posted form fields: field name → submitted value.
pub type FormData = BTreeMap<String, String>;

/// Builds a configuration mapping from the `kind`'s rows in `form`.
///
/// Rows are applied in ascending row number, so if two rows carry the same
/// key the higher-numbered row wins.  Fields belonging to other kinds, and
/// rows missing either half, are ignored.
pub fn config_from_form_data(form: &FormData, kind: &FilterKind) -> ConfigMap {
    let key_prefix = format!("{kind}_key");

    let rows: BTreeSet<u32> = form
        .keys()
        .filter_map(|field| row_number(field, &key_prefix))
        .filter(|&n| form.contains_key(&kind.form_val_field(n)))
        .collect();

    debug!(kind = %kind, rows = rows.len(), "parsing configuration form");

    let mut config = ConfigMap::new();
    for n in rows {
        let (Some(key), Some(val)) = (
            form.get(&kind.form_key_field(n)),
            form.get(&kind.form_val_field(n)),
        ) else {
            continue;
        };

        let key = key.trim();
        let val = val.trim();
        if key.is_empty() || val.is_empty() {
            debug!(kind = %kind, row = n, "skipping blank form row");
            continue;
        }

        config.insert(key.to_string(), val.to_string());
    }
    config
}

/// Extracts `n` from `"{prefix}{n}"`, accepting only canonical positive
/// decimals so the number formats back to the same field name.
fn row_number(field: &str, prefix: &str) -> Option<u32> {
    let digits = field.strip_prefix(prefix)?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
