//! Per-secret content key derivation.
//!
//! contentKey = HKDF-SHA256(rootKey, salt = secretName, info = "content", length = 32)
//!
//! Salting on the secret's name means a rename requires re-encryption under
//! the new name's key — renaming in place is therefore not supported (see
//! `Cryptographer::rename_is_unsupported` in `lib.rs`).

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::EncodingError;

const INFO: &[u8] = b"content";

pub fn derive_content_key(root_key: &[u8; 32], secret_name: &str) -> Result<[u8; 32], EncodingError> {
    let hk = Hkdf::<Sha256>::new(Some(secret_name.as_bytes()), root_key);
    let mut out = [0u8; 32];
    hk.expand(INFO, &mut out)
        .map_err(|e| EncodingError(format!("hkdf expand: {}", e)))?;
    Ok(out)
}
