//! Error types for the envelope layer.

use std::fmt;

/// Envelope could not be produced (CSPRNG failure, AEAD seal failure).
#[derive(Debug)]
pub struct EncodingError(pub(crate) String);

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "encoding error: {}", self.0)
    }
}

impl std::error::Error for EncodingError {}

/// Envelope failed to decrypt: bad AEAD tag, AAD mismatch, unknown key id,
/// or a malformed wire string. All three causes are folded into this one
/// variant-free type per spec: the caller only learns that integrity could
/// not be established, never which check failed.
#[derive(Debug)]
pub struct CryptoIntegrityError(pub(crate) String);

impl CryptoIntegrityError {
    pub(crate) fn unknown_key_id(kid: &str) -> Self {
        Self(format!("unknown key id: {}", kid))
    }

    pub(crate) fn from_encoding(e: EncodingError) -> Self {
        Self(e.0)
    }
}

impl fmt::Display for CryptoIntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crypto integrity error: {}", self.0)
    }
}

impl std::error::Error for CryptoIntegrityError {}
