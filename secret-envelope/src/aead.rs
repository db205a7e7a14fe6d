//! AEAD: AES-256-GCM seal/open over a per-secret derived key.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use getrandom::getrandom;

use crate::error::{CryptoIntegrityError, EncodingError};

/// Generate a random 12-byte nonce. Used during encryption only.
pub fn nonce() -> Result<[u8; 12], EncodingError> {
    let mut n = [0u8; 12];
    getrandom(&mut n).map_err(|e| EncodingError(format!("rng: {}", e)))?;
    Ok(n)
}

/// AEAD seal (encrypt path). Returns ciphertext || tag.
pub fn aead_seal(
    key: &[u8; 32],
    nonce: &[u8; 12],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, EncodingError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| EncodingError(e.to_string()))?;
    let n = Nonce::from_slice(nonce);
    let payload = Payload { msg: plaintext, aad };
    cipher
        .encrypt(n, payload)
        .map_err(|_| EncodingError("seal failed".into()))
}

/// AEAD open (decrypt path). Returns plaintext, or `CryptoIntegrityError` on
/// tag mismatch — which also covers the AAD-binding check.
pub fn aead_open(
    key: &[u8; 32],
    nonce: &[u8; 12],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoIntegrityError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| CryptoIntegrityError(e.to_string()))?;
    let n = Nonce::from_slice(nonce);
    let payload = Payload { msg: ciphertext, aad };
    cipher
        .decrypt(n, payload)
        .map_err(|_| CryptoIntegrityError("AEAD tag or AAD mismatch".into()))
}
