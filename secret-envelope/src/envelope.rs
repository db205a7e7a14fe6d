//! Wire encoding: `base64(nonce ‖ ciphertext ‖ tag) "." kid`.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{CryptoIntegrityError, EncodingError};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// A decoded envelope: nonce, AEAD ciphertext-with-tag, and the key id that
/// produced it. `kid` is at most 16 printable ASCII chars per spec.
pub struct DecodedEnvelope {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
    pub kid: String,
}

pub fn encode(nonce: &[u8; NONCE_LEN], ciphertext: &[u8], kid: &str) -> Result<String, EncodingError> {
    if kid.is_empty() || kid.len() > 16 || !kid.is_ascii() {
        return Err(EncodingError(format!("invalid key id: {:?}", kid)));
    }
    let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    payload.extend_from_slice(nonce);
    payload.extend_from_slice(ciphertext);
    Ok(format!("{}.{}", STANDARD.encode(payload), kid))
}

pub fn decode(envelope: &str) -> Result<DecodedEnvelope, CryptoIntegrityError> {
    let (payload_b64, kid) = envelope
        .rsplit_once('.')
        .ok_or_else(|| CryptoIntegrityError("envelope missing key id delimiter".into()))?;
    if kid.is_empty() {
        return Err(CryptoIntegrityError("envelope has empty key id".into()));
    }
    let payload = STANDARD
        .decode(payload_b64)
        .map_err(|e| CryptoIntegrityError(format!("bad base64: {}", e)))?;
    if payload.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoIntegrityError("envelope payload too short".into()));
    }
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&payload[..NONCE_LEN]);
    let ciphertext = payload[NONCE_LEN..].to_vec();
    Ok(DecodedEnvelope {
        nonce,
        ciphertext,
        kid: kid.to_string(),
    })
}

/// Ciphertext length (plaintext length, since AES-GCM does not pad) implied
/// by a base64'd envelope payload, without decrypting it. Used by the
/// sanitizer (`secret-core`) to report `secretLength` on listing surfaces.
pub fn decoded_length(envelope: &str) -> Result<usize, CryptoIntegrityError> {
    let (payload_b64, _kid) = envelope
        .rsplit_once('.')
        .ok_or_else(|| CryptoIntegrityError("envelope missing key id delimiter".into()))?;
    let payload_len = STANDARD
        .decode(payload_b64)
        .map_err(|e| CryptoIntegrityError(format!("bad base64: {}", e)))?
        .len();
    payload_len
        .checked_sub(NONCE_LEN + TAG_LEN)
        .ok_or_else(|| CryptoIntegrityError("envelope payload shorter than AEAD overhead".into()))
}
