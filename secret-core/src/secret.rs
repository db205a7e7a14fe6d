//! `Secret` — the read-model join of a `SecretSeries` with one
//! `SecretContent` row (spec.md §3). Decryption is lazy: the ciphertext
//! envelope is carried until a caller asks for plaintext.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use secret_envelope::Cryptographer;
use secret_store::types::{ContentId, SeriesId};

use crate::error::CoreError;

/// Joins one series with one content revision. Carries decrypted plaintext
/// only transiently, inside a single request, and only once `plaintext()`
/// has been called.
#[derive(Clone, Debug)]
pub struct Secret {
    pub series_id: SeriesId,
    pub content_id: ContentId,
    pub name: String,
    pub description: String,
    pub version: String,
    pub r#type: Option<String>,
    pub generation_options: HashMap<String, String>,
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    encrypted_content: String,
}

impl Secret {
    pub(crate) fn new(
        series_id: SeriesId,
        content_id: ContentId,
        name: String,
        description: String,
        version: String,
        r#type: Option<String>,
        generation_options: HashMap<String, String>,
        metadata: HashMap<String, String>,
        created_at: DateTime<Utc>,
        created_by: String,
        updated_at: DateTime<Utc>,
        updated_by: String,
        encrypted_content: String,
    ) -> Self {
        Self {
            series_id,
            content_id,
            name,
            description,
            version,
            r#type,
            generation_options,
            metadata,
            created_at,
            created_by,
            updated_at,
            updated_by,
            encrypted_content,
        }
    }

    /// Decrypts the ciphertext envelope, invoking `Cryptographer` exactly
    /// once per call, with the owning series' name as AAD.
    pub fn plaintext(&self, crypto: &Cryptographer) -> Result<Vec<u8>, CoreError> {
        Ok(crypto.decrypt(&self.name, &self.encrypted_content)?)
    }

    /// Decoded plaintext length, without decrypting — used by `Sanitizer`.
    pub fn decoded_length(&self) -> Result<usize, CoreError> {
        Ok(Cryptographer::decoded_length(&self.encrypted_content)?)
    }

    pub(crate) fn encrypted_content(&self) -> &str {
        &self.encrypted_content
    }
}
