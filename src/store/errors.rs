//! Store error types

use thiserror::Error;

/// Result type for store commands
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store commands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The key exists but holds a different data structure
    #[error("key '{key}' holds a {found} value, expected {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A counter field holds a value that cannot be parsed as a number
    #[error("value at '{key}'.'{field}' is not a number")]
    NotANumber { key: String, field: String },

    /// The named search index has not been created
    #[error("no such index: {0}")]
    UnknownIndex(String),
}

impl StoreError {
    pub(crate) fn wrong_type(key: &str, expected: &'static str, found: &'static str) -> Self {
        StoreError::WrongType {
            key: key.to_string(),
            expected,
            found,
        }
    }
}
