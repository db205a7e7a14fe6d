//! `CoreError` — the error hierarchy exposed at the boundary of this crate
//! (spec.md §7), folding in the per-crate errors of `secret-store` and
//! `secret-envelope` via `From`.

use std::fmt;

use secret_envelope::{CryptoIntegrityError, EncodingError};
use secret_store::StoreError;
use tracing::{debug, error, warn};

#[derive(Debug)]
pub enum CoreError {
    /// Entity absent.
    NotFound(String),
    /// Unique-key violation on name or (series, version).
    Conflict(String),
    /// Principal lacks access. Callers at the public boundary must rewrite
    /// this to `NotFound` before it reaches an external caller (spec.md §7
    /// anti-enumeration policy) — `AclEngine` does this internally, so this
    /// variant should not normally escape `secret-core`.
    Forbidden,
    /// AEAD tag or AAD mismatch: data corruption or cross-series ciphertext
    /// reuse. Never swallowed, always logged at `error!` before return.
    CryptoIntegrity(String),
    /// Transport or constraint failure not covered above.
    Store(String),
    /// Empty name, name containing `..`, or non-string metadata.
    InvalidInput(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {}", what),
            Self::Conflict(what) => write!(f, "conflict: {}", what),
            Self::Forbidden => write!(f, "forbidden"),
            Self::CryptoIntegrity(msg) => write!(f, "crypto integrity error: {}", msg),
            Self::Store(msg) => write!(f, "store error: {}", msg),
            Self::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        let mapped = match e {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::Conflict(what) => Self::Conflict(what),
            StoreError::Storage(msg) => Self::Store(msg),
            StoreError::InvalidInput(what) => Self::InvalidInput(what),
        };
        match &mapped {
            Self::NotFound(_) | Self::Conflict(_) | Self::InvalidInput(_) => {
                debug!(error = %mapped, "store returned expected error")
            }
            Self::Store(_) => warn!(error = %mapped, "store error"),
            _ => {}
        }
        mapped
    }
}

impl From<CryptoIntegrityError> for CoreError {
    fn from(e: CryptoIntegrityError) -> Self {
        error!(error = %e, "crypto integrity error");
        Self::CryptoIntegrity(e.to_string())
    }
}

impl From<EncodingError> for CoreError {
    fn from(e: EncodingError) -> Self {
        error!(error = %e, "envelope encoding error");
        Self::CryptoIntegrity(e.to_string())
    }
}
