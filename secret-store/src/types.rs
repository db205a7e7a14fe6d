//! Core types: entity identifiers and the persisted-row shapes of the data
//! model (spec.md §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl $name {
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                Self(v)
            }
        }
    };
}

id_newtype!(SeriesId);
id_newtype!(ContentId);
id_newtype!(ClientId);
id_newtype!(GroupId);

// ---------------------------------------------------------------------------
// SecretSeries
// ---------------------------------------------------------------------------

/// Identity of a named secret over time (spec.md §3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SecretSeries {
    pub id: SeriesId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub r#type: Option<String>,
    pub generation_options: HashMap<String, String>,
    pub metadata: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// SecretContent
// ---------------------------------------------------------------------------

/// One immutable revision of a series.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SecretContent {
    pub id: ContentId,
    pub secret_series_id: SeriesId,
    pub encrypted_content: String,
    /// Possibly empty; `""` denotes the legacy unversioned revision.
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

// ---------------------------------------------------------------------------
// Client / Group / membership edges
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub automation: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Fields recognized by `SecretSeriesStore::create_series` (spec.md §4.3).
#[derive(Clone, Debug, Default)]
pub struct NewSeries {
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub r#type: Option<String>,
    pub generation_options: HashMap<String, String>,
    pub metadata: HashMap<String, String>,
}

/// Metadata keys must be non-empty, printable strings (spec.md §4.3).
pub fn validate_metadata_keys(metadata: &HashMap<String, String>) -> Result<(), StoreError> {
    for key in metadata.keys() {
        if key.is_empty() || key.chars().any(|c| c.is_control()) {
            return Err(StoreError::InvalidInput(format!(
                "metadata key {:?} must be a non-empty printable string",
                key
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_metadata_key() {
        let mut metadata = HashMap::new();
        metadata.insert(String::new(), "value".to_string());
        assert!(matches!(validate_metadata_keys(&metadata), Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn rejects_non_printable_metadata_key() {
        let mut metadata = HashMap::new();
        metadata.insert("bad\u{0007}key".to_string(), "value".to_string());
        assert!(matches!(validate_metadata_keys(&metadata), Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn accepts_printable_non_empty_keys() {
        let mut metadata = HashMap::new();
        metadata.insert("owner".to_string(), "platform-team".to_string());
        assert!(validate_metadata_keys(&metadata).is_ok());
    }
}
