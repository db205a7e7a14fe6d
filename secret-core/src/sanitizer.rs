//! C9 — Sanitizer: redacted projections of secrets for listing surfaces.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use secret_store::types::{ContentId, SeriesId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::secret::Secret;

/// Same fields as `Secret` minus `encryptedContent` and any plaintext, plus
/// the decoded content length. Safe for listing responses (spec.md §4.9).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedSecret {
    pub id: SeriesId,
    pub content_id: ContentId,
    pub name: String,
    pub description: String,
    pub version: String,
    pub checksum: String,
    pub r#type: Option<String>,
    pub generation_options: HashMap<String, String>,
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub secret_length: usize,
}

/// Produces a `SanitizedSecret` for `secret`. The decoded length is derived
/// from the ciphertext envelope's known overhead, without decrypting.
pub fn sanitize(secret: &Secret) -> Result<SanitizedSecret, CoreError> {
    let secret_length = secret.decoded_length()?;
    Ok(SanitizedSecret {
        id: secret.series_id,
        content_id: secret.content_id,
        name: secret.name.clone(),
        description: secret.description.clone(),
        version: secret.version.clone(),
        checksum: checksum_of(secret.encrypted_content()),
        r#type: secret.r#type.clone(),
        generation_options: secret.generation_options.clone(),
        metadata: secret.metadata.clone(),
        created_at: secret.created_at,
        created_by: secret.created_by.clone(),
        updated_at: secret.updated_at,
        updated_by: secret.updated_by.clone(),
        secret_length,
    })
}

/// Stable identifier for a content revision's ciphertext, exposed on the
/// listing surface so a UI can detect whether a cached copy is stale
/// without re-fetching plaintext. Not a cryptographic integrity check —
/// `Cryptographer` already owns that via the AEAD tag.
fn checksum_of(encrypted_content: &str) -> String {
    let digest = Sha256::digest(encrypted_content.as_bytes());
    hex::encode(&digest[..8])
}
