//! Filter kinds and instance identifiers.
//!
//! A [`FilterKind`] names a family of filters (e.g. `"NameFilter"`).  Together
//! with a caller-chosen instance `uid` it determines the snapshot file name
//! (`"{kind}_{uid}.json"`) and the prefix of the form fields that edit the
//! filter (`"{kind}_key{n}"`).  Both parts end up inside a file name, so both
//! are validated to be non-empty plain names.

use std::fmt;

use thiserror::Error;

/// Rejection of a kind or uid that cannot be embedded in a file name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} {value:?} must not contain path separators or '..'")]
    PathLike { field: &'static str, value: String },
}

/// Explicit name of a filter family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterKind(String);

impl FilterKind {
    /// # Errors
    ///
    /// Returns [`IdentifierError`] if `name` is empty or path-like.
    pub fn new(name: impl Into<String>) -> Result<Self, IdentifierError> {
        let name = name.into();
        validate("filter kind", &name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Snapshot file name for instance `uid` of this kind.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] if `uid` is empty or path-like.
    pub fn file_name(&self, uid: &str) -> Result<String, IdentifierError> {
        validate_uid(uid)?;
        Ok(format!("{}_{}.json", self.0, uid))
    }

    /// Name of the `n`th key field in a configuration form.
    pub fn form_key_field(&self, n: u32) -> String {
        format!("{}_key{}", self.0, n)
    }

    /// Name of the `n`th value field in a configuration form.
    pub fn form_val_field(&self, n: u32) -> String {
        format!("{}_val{}", self.0, n)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks that an instance uid can be embedded in a snapshot file name.
///
/// # Errors
///
/// Returns [`IdentifierError`] if `uid` is empty or path-like.
pub fn validate_uid(uid: &str) -> Result<(), IdentifierError> {
    validate("uid", uid)
}

fn validate(field: &'static str, value: &str) -> Result<(), IdentifierError> {
    if value.is_empty() {
        return Err(IdentifierError::Empty { field });
    }
    if value.contains('/') || value.contains('\\') || value.contains("..") || value.contains('\0') {
        return Err(IdentifierError::PathLike {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
