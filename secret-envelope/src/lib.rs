//! # secret-envelope
//!
//! AEAD content envelope for secret storage (C1 — "Cryptographer") and
//! opaque version tokens for secret revisions (C2 — "VersionStamp").
//!
//! ## Quick start
//!
//! ```
//! use secret_envelope::{Cryptographer, RootKey};
//!
//! let root = RootKey::new("kid-1", [7u8; 32]);
//! let crypto = Cryptographer::new(root);
//!
//! let envelope = crypto.encrypt("DB_PASSWORD", b"hunter2").unwrap();
//! let plaintext = crypto.decrypt("DB_PASSWORD", &envelope).unwrap();
//! assert_eq!(plaintext, b"hunter2");
//! ```
//!
//! ## Security properties
//!
//! - Per-secret keys are derived from a single root key via
//!   `HKDF-SHA256(rootKey, salt = secretName, info = "content")`.
//! - The secret's own name is bound into the AEAD as associated data, so
//!   ciphertext copy-pasted from one series into another's content row
//!   fails to decrypt (`CryptoIntegrityError`) instead of silently
//!   decrypting under the wrong identity.
//! - Root key rotation is supported for decryption (old content keeps
//!   decrypting under its retired root key) but encryption always uses the
//!   current root key.
//!
//! ## What's NOT provided
//!
//! - Key management / storage of the root key itself (see `secret-store`'s
//!   `Config`).
//! - Rename: renaming a series would require re-deriving and re-encrypting
//!   every content row under the new name, which this crate does not do.
//!   The core's `SecretController` treats rename as unsupported (delete +
//!   recreate), per spec.

mod aead;
mod envelope;
mod error;
mod kdf;
mod rootkey;
mod version;

pub use error::{CryptoIntegrityError, EncodingError};
pub use rootkey::{RootKey, RootKeyring};
pub use version::VersionStamp;

/// AEAD envelope encryptor/decryptor bound to one (possibly rotating) root
/// key. Stateless beyond the keyring: safe to share behind an `Arc` across
/// request-parallel callers.
pub struct Cryptographer {
    keyring: RootKeyring,
}

impl Cryptographer {
    pub fn new(root: RootKey) -> Self {
        Self {
            keyring: RootKeyring::new(root),
        }
    }

    pub fn with_keyring(keyring: RootKeyring) -> Self {
        Self { keyring }
    }

    /// Rotate the current root key. Content encrypted under the previous
    /// root key remains decryptable.
    pub fn rotate(&mut self, new_current: RootKey) {
        self.keyring.rotate(new_current);
    }

    pub fn current_key_id(&self) -> &str {
        self.keyring.current().kid()
    }

    /// Encrypt `plaintext` for the secret named `secret_name`, returning the
    /// wire envelope: `base64(nonce ‖ ciphertext ‖ tag) "." kid`.
    pub fn encrypt(&self, secret_name: &str, plaintext: &[u8]) -> Result<String, EncodingError> {
        let current = self.keyring.current();
        let content_key = kdf::derive_content_key(current.bytes(), secret_name)?;
        let nonce = aead::nonce()?;
        let ciphertext = aead::aead_seal(&content_key, &nonce, plaintext, secret_name.as_bytes())?;
        envelope::encode(&nonce, &ciphertext, current.kid())
    }

    /// Decrypt `envelope`, verifying it was encrypted for `secret_name`.
    /// Fails uniformly with `CryptoIntegrityError` on a bad tag, an AAD
    /// (name) mismatch, an unknown key id, or a malformed envelope string —
    /// the caller cannot distinguish which, by design (spec §4.1, §7).
    pub fn decrypt(&self, secret_name: &str, envelope: &str) -> Result<Vec<u8>, CryptoIntegrityError> {
        let decoded = envelope::decode(envelope)?;
        let root = self
            .keyring
            .find(&decoded.kid)
            .ok_or_else(|| CryptoIntegrityError::unknown_key_id(&decoded.kid))?;
        let content_key = kdf::derive_content_key(root.bytes(), secret_name)
            .map_err(CryptoIntegrityError::from_encoding)?;
        aead::aead_open(&content_key, &decoded.nonce, &decoded.ciphertext, secret_name.as_bytes())
    }

    /// Decoded plaintext length implied by an envelope's ciphertext, without
    /// decrypting. Used by the sanitizer for listing surfaces.
    pub fn decoded_length(envelope: &str) -> Result<usize, CryptoIntegrityError> {
        envelope::decoded_length(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crypto() -> Cryptographer {
        Cryptographer::new(RootKey::new("kid-1", [42u8; 32]))
    }

    #[test]
    fn roundtrip() {
        let c = crypto();
        let env = c.encrypt("DB_PASSWORD", b"hunter2").unwrap();
        assert_eq!(c.decrypt("DB_PASSWORD", &env).unwrap(), b"hunter2");
    }

    #[test]
    fn roundtrip_empty_plaintext() {
        let c = crypto();
        let env = c.encrypt("EMPTY", b"").unwrap();
        assert_eq!(c.decrypt("EMPTY", &env).unwrap(), b"");
    }

    #[test]
    fn roundtrip_large_plaintext() {
        let c = crypto();
        let plaintext = vec![0xABu8; 65536];
        let env = c.encrypt("BIG", &plaintext).unwrap();
        assert_eq!(c.decrypt("BIG", &env).unwrap(), plaintext);
    }

    #[test]
    fn cross_series_ciphertext_reuse_fails() {
        let c = crypto();
        let env_a = c.encrypt("SERIES_A", b"secret-a-data").unwrap();
        let result = c.decrypt("SERIES_B", &env_a);
        assert!(result.is_err());
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let c = crypto();
        let env = c.encrypt("NAME", b"data").unwrap();
        let (payload, kid) = env.rsplit_once('.').unwrap();
        let mut bytes = payload.as_bytes().to_vec();
        let last = bytes.len() - 1;
        bytes[last] ^= 1;
        let tampered = format!("{}.{}", String::from_utf8_lossy(&bytes), kid);
        // mutating a base64 char may or may not still decode; either a
        // base64 error or an AEAD mismatch is an acceptable failure here.
        assert!(c.decrypt("NAME", &tampered).is_err());
    }

    #[test]
    fn malformed_envelope_fails() {
        let c = crypto();
        assert!(c.decrypt("NAME", "not-a-valid-envelope").is_err());
        assert!(c.decrypt("NAME", "").is_err());
        assert!(c.decrypt("NAME", ".").is_err());
    }

    #[test]
    fn unknown_key_id_fails() {
        let c = crypto();
        let env = c.encrypt("NAME", b"data").unwrap();
        let (payload, _kid) = env.rsplit_once('.').unwrap();
        let forged = format!("{}.unknown-kid", payload);
        assert!(c.decrypt("NAME", &forged).is_err());
    }

    #[test]
    fn rotation_keeps_old_content_decryptable() {
        let mut c = crypto();
        let env_v1 = c.encrypt("NAME", b"v1-data").unwrap();
        c.rotate(RootKey::new("kid-2", [99u8; 32]));
        let env_v2 = c.encrypt("NAME", b"v2-data").unwrap();

        assert_eq!(c.decrypt("NAME", &env_v1).unwrap(), b"v1-data");
        assert_eq!(c.decrypt("NAME", &env_v2).unwrap(), b"v2-data");
        assert_eq!(c.current_key_id(), "kid-2");
    }

    #[test]
    fn decoded_length_matches_plaintext_length_without_decrypting() {
        let c = crypto();
        for len in [0usize, 1, 7, 1000] {
            let plaintext = vec![0u8; len];
            let env = c.encrypt("NAME", &plaintext).unwrap();
            assert_eq!(Cryptographer::decoded_length(&env).unwrap(), len);
        }
    }

    #[test]
    fn different_secrets_encrypt_to_different_keys() {
        // Same plaintext, different names: ciphertexts must not be
        // interchangeable even before considering AAD, since the derived
        // content key itself differs.
        let c = crypto();
        let env1 = c.decrypt_name_probe("ALPHA");
        let env2 = c.decrypt_name_probe("BETA");
        assert_ne!(env1, env2);
    }

    impl Cryptographer {
        // Test-only helper exposing the derived key so the "different
        // secrets get different keys" property can be checked directly.
        fn decrypt_name_probe(&self, name: &str) -> [u8; 32] {
            kdf::derive_content_key(self.keyring.current().bytes(), name).unwrap()
        }
    }
}
