//! Error type for the storage layer.

use std::fmt;

/// Errors raised by `SeriesStore`, `ContentStore`, and `MembershipStore`
/// (spec.md §7: `NotFound`, `Conflict`, `StoreError`).
#[derive(Debug)]
pub enum StoreError {
    /// Requested entity does not exist.
    NotFound(String),
    /// Unique-key violation on name, or on (series, version).
    Conflict(String),
    /// Transport or constraint failure not covered by the above.
    Storage(String),
    /// A field failed a store-level validity check, e.g. an empty or
    /// non-printable metadata key (spec.md §4.3).
    InvalidInput(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {}", what),
            Self::Conflict(what) => write!(f, "conflict: {}", what),
            Self::Storage(msg) => write!(f, "storage error: {}", msg),
            Self::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => Self::NotFound("row".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(db.message().to_string())
            }
            other => Self::Storage(other.to_string()),
        }
    }
}
