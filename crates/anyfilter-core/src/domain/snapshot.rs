//! Versioned configuration snapshots.
//!
//! A filter's configuration is never edited in place.  Each save appends a
//! [`ConfigSnapshot`] to the filter's [`ConfigHistory`], and the configuration
//! the filter actually runs with (the *active* configuration) is always
//! derived from that history.
//!
//! # On-disk shape
//!
//! A history serializes as a bare JSON array:
//!
//! ```json
//! [
//!   {"created_date": "2024-03-01 09:15:00", "user": "alice", "config": {}},
//!   {"created_date": "2024-03-02 17:40:12", "user": "bob", "config": {"dog": "canine"}}
//! ]
//! ```
//!
//! `created_date` uses [`CREATED_DATE_FORMAT`] (second precision, no zone).
//! Any document that does not match this shape is rejected by
//! [`ConfigHistory::parse`]; callers decide how to recover.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Untyped configuration mapping: record key → replacement, threshold, etc.
///
/// A `BTreeMap` keeps serialized output stable across saves; ordering carries
/// no meaning for equality.
pub type ConfigMap = BTreeMap<String, String>;

/// `strftime` format of the `created_date` field.
pub const CREATED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Why a history document could not be read.
#[derive(Debug, Error)]
pub enum HistoryParseError {
    /// The document contained only whitespace.
    #[error("history document is empty")]
    Empty,

    /// The document is not a JSON array of well-formed snapshots.
    #[error("history document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One persisted version of a filter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When the snapshot was saved, truncated to whole seconds.
    #[serde(rename = "created_date", with = "created_date")]
    pub created_at: NaiveDateTime,
    /// Who saved the snapshot.
    pub user: String,
    /// The configuration mapping as saved.
    pub config: ConfigMap,
}

impl ConfigSnapshot {
    /// Creates a snapshot, dropping any sub-second part of `created_at` so the
    /// in-memory value matches what survives a round trip through the file.
    pub fn new(created_at: NaiveDateTime, user: impl Into<String>, config: ConfigMap) -> Self {
        Self {
            created_at: created_at.with_nanosecond(0).unwrap_or(created_at),
            user: user.into(),
            config,
        }
    }
}

/// The full, append-only list of snapshots for one filter instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigHistory {
    snapshots: Vec<ConfigSnapshot>,
}

impl ConfigHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing list of snapshots, preserving their order.
    pub fn from_snapshots(snapshots: Vec<ConfigSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Parses a history document.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryParseError::Empty`] for a blank document and
    /// [`HistoryParseError::Malformed`] for anything that is not a JSON array
    /// of `{created_date, user, config}` objects.
    pub fn parse(raw: &str) -> Result<Self, HistoryParseError> {
        if raw.trim().is_empty() {
            return Err(HistoryParseError::Empty);
        }
        Ok(serde_json::from_str(raw)?)
    }

    /// Serializes the history as a compact JSON array.
    ///
    /// # Errors
    ///
    /// Propagates [`serde_json::Error`]; with string-only maps this does not
    /// happen in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Appends a snapshot.  Earlier entries are never touched.
    pub fn push(&mut self, snapshot: ConfigSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshots in file order (not necessarily chronological).
    pub fn snapshots(&self) -> &[ConfigSnapshot] {
        &self.snapshots
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigSnapshot> {
        self.snapshots.iter()
    }

    /// The snapshot with the greatest `created_at`.
    ///
    /// When several snapshots share the greatest timestamp, the one appearing
    /// last in the history wins.
    pub fn latest(&self) -> Option<&ConfigSnapshot> {
        self.snapshots.iter().max_by_key(|s| s.created_at)
    }

    /// The configuration a filter should run with: the mapping of
    /// [`latest`](Self::latest), or an empty mapping for an empty history.
    pub fn active_config(&self) -> ConfigMap {
        self.latest()
            .map(|s| s.config.clone())
            .unwrap_or_default()
    }
}

mod created_date {
    use chrono::NaiveDateTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::CREATED_DATE_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(CREATED_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, CREATED_DATE_FORMAT).map_err(D::Error::custom)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, CREATED_DATE_FORMAT).expect("valid test timestamp")
    }

    fn config(pairs: &[(&str, &str)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ── active_config selection ───────────────────────────────────────────────

    #[test]
    fn test_active_config_of_empty_history_is_empty() {
        let history = ConfigHistory::new();
        assert!(history.active_config().is_empty());
        assert!(history.latest().is_none());
    }

    #[test]
    fn test_active_config_picks_latest_created_at() {
        // Arrange
        let history = ConfigHistory::from_snapshots(vec![
            ConfigSnapshot::new(at("2024-01-01 10:00:00"), "u1", ConfigMap::new()),
            ConfigSnapshot::new(at("2024-01-02 10:00:00"), "u2", config(&[("a", "b")])),
        ]);

        // Act
        let active = history.active_config();

        // Assert
        assert_eq!(active, config(&[("a", "b")]));
    }

    #[test]
    fn test_active_config_ignores_file_order() {
        // Arrange: newest snapshot stored first
        let history = ConfigHistory::from_snapshots(vec![
            ConfigSnapshot::new(at("2024-05-01 00:00:00"), "late", config(&[("x", "new")])),
            ConfigSnapshot::new(at("2023-05-01 00:00:00"), "early", config(&[("x", "old")])),
        ]);

        // Act / Assert
        assert_eq!(history.active_config(), config(&[("x", "new")]));
        assert_eq!(history.latest().map(|s| s.user.as_str()), Some("late"));
    }

    #[test]
    fn test_active_config_tie_is_won_by_last_entry() {
        // Two saves within the same second share a timestamp.
        let history = ConfigHistory::from_snapshots(vec![
            ConfigSnapshot::new(at("2024-01-01 10:00:00"), "first", config(&[("k", "1")])),
            ConfigSnapshot::new(at("2024-01-01 10:00:00"), "second", config(&[("k", "2")])),
        ]);

        assert_eq!(history.active_config(), config(&[("k", "2")]));
    }

    #[test]
    fn test_push_keeps_earlier_entries() {
        let mut history = ConfigHistory::new();
        history.push(ConfigSnapshot::new(at("2024-01-01 00:00:00"), "a", ConfigMap::new()));
        history.push(ConfigSnapshot::new(at("2024-01-02 00:00:00"), "b", config(&[("k", "v")])));

        assert_eq!(history.len(), 2);
        assert_eq!(history.snapshots()[0].user, "a");
        assert_eq!(history.snapshots()[1].user, "b");
    }

    #[test]
    fn test_snapshot_new_truncates_sub_second_precision() {
        let precise = at("2024-01-01 12:30:45")
            .with_nanosecond(987_654_321)
            .expect("valid nanosecond");

        let snapshot = ConfigSnapshot::new(precise, "u", ConfigMap::new());

        assert_eq!(snapshot.created_at, at("2024-01-01 12:30:45"));
    }

    // ── Parsing ───────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_reads_created_date_user_and_config() {
        // Arrange
        let raw = r#"[{"created_date":"2024-03-02 17:40:12","user":"bob","config":{"dog":"canine"}}]"#;

        // Act
        let history = ConfigHistory::parse(raw).expect("well-formed history");

        // Assert
        assert_eq!(history.len(), 1);
        let snapshot = &history.snapshots()[0];
        assert_eq!(snapshot.created_at, at("2024-03-02 17:40:12"));
        assert_eq!(snapshot.user, "bob");
        assert_eq!(snapshot.config, config(&[("dog", "canine")]));
    }

    #[test]
    fn test_parse_empty_array_is_empty_history() {
        let history = ConfigHistory::parse("[]").expect("empty array is valid");
        assert!(history.is_empty());
    }

    #[test]
    fn test_parse_blank_document_is_empty_error() {
        let result = ConfigHistory::parse("  \n");
        assert!(matches!(result, Err(HistoryParseError::Empty)));
    }

    #[test]
    fn test_parse_invalid_json_is_malformed() {
        let result = ConfigHistory::parse("{not json");
        assert!(matches!(result, Err(HistoryParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_object_instead_of_array() {
        let result = ConfigHistory::parse(r#"{"dog":"canine"}"#);
        assert!(matches!(result, Err(HistoryParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_missing_user() {
        let raw = r#"[{"created_date":"2024-03-02 17:40:12","config":{}}]"#;
        assert!(ConfigHistory::parse(raw).is_err());
    }

    #[test]
    fn test_parse_rejects_non_string_config_values() {
        let raw = r#"[{"created_date":"2024-03-02 17:40:12","user":"u","config":{"n":1}}]"#;
        assert!(ConfigHistory::parse(raw).is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_date_format() {
        let raw = r#"[{"created_date":"2024-03-02T17:40:12Z","user":"u","config":{}}]"#;
        assert!(ConfigHistory::parse(raw).is_err());
    }

    #[test]
    fn test_to_json_uses_created_date_field_and_format() {
        // Arrange
        let history = ConfigHistory::from_snapshots(vec![ConfigSnapshot::new(
            at("2024-03-02 07:05:09"),
            "alice",
            config(&[("cat", "feline")]),
        )]);

        // Act
        let json = history.to_json().expect("serialize");

        // Assert
        assert_eq!(
            json,
            r#"[{"created_date":"2024-03-02 07:05:09","user":"alice","config":{"cat":"feline"}}]"#
        );
    }
}
