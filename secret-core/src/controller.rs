//! C5 — SecretController: composes C1 (Cryptographer), C3 (SeriesStore),
//! and C4 (ContentStore) into the "secret" abstraction.

use std::collections::HashMap;
use std::sync::Arc;

use secret_envelope::{Cryptographer, VersionStamp};
use secret_store::types::{NewSeries, SeriesId};
use secret_store::{ContentStore, SeriesStore};

use crate::error::CoreError;
use crate::secret::Secret;

pub struct SecretController<SS, CS> {
    series_store: Arc<SS>,
    content_store: Arc<CS>,
    crypto: Arc<Cryptographer>,
}

impl<SS, CS> SecretController<SS, CS>
where
    SS: SeriesStore,
    CS: ContentStore,
{
    pub fn new(series_store: Arc<SS>, content_store: Arc<CS>, crypto: Arc<Cryptographer>) -> Self {
        Self { series_store, content_store, crypto }
    }

    /// `build(name, plaintext, creator).withDescription(...)....create()`
    /// (spec.md §4.5). Recognized options are enumerated on `SecretBuilder`.
    pub fn build(&self, name: impl Into<String>, plaintext: impl Into<Vec<u8>>, creator: impl Into<String>) -> SecretBuilder<'_, SS, CS> {
        SecretBuilder {
            controller: self,
            name: name.into(),
            plaintext: plaintext.into(),
            creator: creator.into(),
            description: String::new(),
            version: None,
            auto_version: false,
            metadata: HashMap::new(),
            r#type: None,
            generation_options: HashMap::new(),
        }
    }

    /// Empty-string `version` means "the unversioned row, if any" — not
    /// "any version" (spec.md §4.5, §9 open question, frozen).
    pub async fn get_by_name_and_version(&self, name: &str, version: &str) -> Result<Option<Secret>, CoreError> {
        let series = match self.series_store.get_by_name(name).await? {
            Some(series) => series,
            None => return Ok(None),
        };
        self.content_for_version(series.id, series.name, series.description, series.r#type, series.generation_options, series.metadata, version).await
    }

    pub async fn get_by_id_and_version(&self, id: SeriesId, version: &str) -> Result<Option<Secret>, CoreError> {
        let series = match self.series_store.get_by_id(id).await? {
            Some(series) => series,
            None => return Ok(None),
        };
        self.content_for_version(series.id, series.name, series.description, series.r#type, series.generation_options, series.metadata, version).await
    }

    /// Every version of a series, one `Secret` per content revision.
    pub async fn gets_by_id(&self, id: SeriesId) -> Result<Vec<Secret>, CoreError> {
        let series = match self.series_store.get_by_id(id).await? {
            Some(series) => series,
            None => return Ok(Vec::new()),
        };
        let contents = self.content_store.list_by_series(id).await?;
        Ok(contents
            .into_iter()
            .map(|content| {
                Secret::new(
                    series.id,
                    content.id,
                    series.name.clone(),
                    series.description.clone(),
                    content.version,
                    series.r#type.clone(),
                    series.generation_options.clone(),
                    series.metadata.clone(),
                    content.created_at,
                    content.created_by,
                    content.updated_at,
                    content.updated_by,
                    content.encrypted_content,
                )
            })
            .collect())
    }

    /// Cartesian of series × their contents; ordered by series id, then
    /// content id.
    pub async fn list_all(&self) -> Result<Vec<Secret>, CoreError> {
        let mut series_list = self.series_store.list_all().await?;
        series_list.sort_by_key(|s| s.id.as_i64());
        let mut out = Vec::new();
        for series in series_list {
            let mut contents = self.content_store.list_by_series(series.id).await?;
            contents.sort_by_key(|c| c.id.as_i64());
            for content in contents {
                out.push(Secret::new(
                    series.id,
                    content.id,
                    series.name.clone(),
                    series.description.clone(),
                    content.version,
                    series.r#type.clone(),
                    series.generation_options.clone(),
                    series.metadata.clone(),
                    content.created_at,
                    content.created_by,
                    content.updated_at,
                    content.updated_by,
                    content.encrypted_content,
                ));
            }
        }
        Ok(out)
    }

    /// Cascades to every content row of the series. Idempotent success if
    /// `name` is absent.
    pub async fn delete_series(&self, name: &str) -> Result<(), CoreError> {
        if let Some(series) = self.series_store.get_by_name(name).await? {
            self.content_store.delete_by_series(series.id).await?;
            self.series_store.delete_by_id(series.id).await?;
        }
        Ok(())
    }

    /// Leaves the series row in place so the name reservation survives.
    pub async fn delete_version(&self, name: &str, version: &str) -> Result<(), CoreError> {
        if let Some(series) = self.series_store.get_by_name(name).await? {
            self.content_store.delete_by_series_and_version(series.id, version).await?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn content_for_version(
        &self,
        series_id: SeriesId,
        name: String,
        description: String,
        r#type: Option<String>,
        generation_options: HashMap<String, String>,
        metadata: HashMap<String, String>,
        version: &str,
    ) -> Result<Option<Secret>, CoreError> {
        let contents = self.content_store.list_by_series(series_id).await?;
        let found = contents.into_iter().find(|c| c.version == version);
        Ok(found.map(|content| {
            Secret::new(
                series_id,
                content.id,
                name,
                description,
                content.version,
                r#type,
                generation_options,
                metadata,
                content.created_at,
                content.created_by,
                content.updated_at,
                content.updated_by,
                content.encrypted_content,
            )
        }))
    }
}

/// Configuration record for `SecretController::build` (spec.md §9: "builder
/// pattern for create" re-architected as a record the store accepts
/// atomically).
pub struct SecretBuilder<'a, SS, CS> {
    controller: &'a SecretController<SS, CS>,
    name: String,
    plaintext: Vec<u8>,
    creator: String,
    description: String,
    version: Option<String>,
    auto_version: bool,
    metadata: HashMap<String, String>,
    r#type: Option<String>,
    generation_options: HashMap<String, String>,
}

impl<'a, SS, CS> SecretBuilder<'a, SS, CS>
where
    SS: SeriesStore,
    CS: ContentStore,
{
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Requests that C2 generate a version token when none is given
    /// explicitly via `with_version`.
    pub fn auto_version(mut self) -> Self {
        self.auto_version = true;
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_type(mut self, r#type: impl Into<String>) -> Self {
        self.r#type = Some(r#type.into());
        self
    }

    pub fn with_generation_options(mut self, generation_options: HashMap<String, String>) -> Self {
        self.generation_options = generation_options;
        self
    }

    /// Series lookup by name → create series if absent (else reuse) →
    /// encrypt via C1 → insert content. Never partially succeeds: if
    /// content insertion fails and the series was freshly created in this
    /// call, the series row is rolled back.
    pub async fn create(self) -> Result<Secret, CoreError> {
        if self.name.is_empty() || self.name.contains("..") {
            return Err(CoreError::InvalidInput(format!("invalid secret name: {:?}", self.name)));
        }
        secret_store::types::validate_metadata_keys(&self.metadata)?;

        let version = match self.version {
            Some(v) => v,
            None if self.auto_version => VersionStamp::generate(),
            None => String::new(),
        };

        let controller = self.controller;
        let (series_id, freshly_created) = match controller.series_store.get_by_name(&self.name).await? {
            Some(series) => (series.id, false),
            None => {
                let id = controller
                    .series_store
                    .create_series(NewSeries {
                        name: self.name.clone(),
                        description: self.description.clone(),
                        created_by: self.creator.clone(),
                        r#type: self.r#type.clone(),
                        generation_options: self.generation_options.clone(),
                        metadata: self.metadata.clone(),
                    })
                    .await?;
                (id, true)
            }
        };

        let envelope = controller.crypto.encrypt(&self.name, &self.plaintext)?;

        let content_result = controller
            .content_store
            .create(series_id, envelope, version.clone(), self.creator.clone())
            .await;

        let content_id = match content_result {
            Ok(id) => id,
            Err(err) => {
                if freshly_created {
                    controller.series_store.delete_by_id(series_id).await?;
                }
                return Err(err.into());
            }
        };

        let series = controller
            .series_store
            .get_by_id(series_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("series {}", series_id)))?;
        let content = controller
            .content_store
            .get_by_id(content_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("content {}", content_id)))?;

        Ok(Secret::new(
            series.id,
            content.id,
            series.name,
            series.description,
            content.version,
            series.r#type,
            series.generation_options,
            series.metadata,
            content.created_at,
            content.created_by,
            content.updated_at,
            content.updated_by,
            content.encrypted_content,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secret_envelope::RootKey;
    use secret_store::{InMemoryContentStore, InMemorySeriesStore};

    fn controller() -> SecretController<InMemorySeriesStore, InMemoryContentStore> {
        SecretController::new(
            Arc::new(InMemorySeriesStore::new()),
            Arc::new(InMemoryContentStore::new()),
            Arc::new(Cryptographer::new(RootKey::new("kid-1", [9u8; 32]))),
        )
    }

    #[tokio::test]
    async fn create_then_read_roundtrips_plaintext() {
        let c = controller();
        let secret = c.build("DB_Pass", b"hunter2".to_vec(), "admin").create().await.unwrap();
        assert_eq!(secret.plaintext(&Cryptographer::new(RootKey::new("kid-1", [9u8; 32]))).unwrap(), b"hunter2");

        let fetched = c.get_by_name_and_version("DB_Pass", "").await.unwrap().unwrap();
        assert_eq!(fetched.name, "DB_Pass");
    }

    #[tokio::test]
    async fn duplicate_name_and_version_conflicts_without_partial_state() {
        let c = controller();
        c.build("X", b"p".to_vec(), "a").create().await.unwrap();
        let err = c.build("X", b"p".to_vec(), "a").create().await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(c.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn auto_version_produces_distinct_coexisting_versions() {
        let c = controller();
        let v1 = c.build("API_KEY", b"v1data".to_vec(), "a").auto_version().create().await.unwrap();
        let v2 = c.build("API_KEY", b"v2data".to_vec(), "a").auto_version().create().await.unwrap();
        assert_ne!(v1.version, v2.version);

        let series_id = v1.series_id;
        let all = c.gets_by_id(series_id).await.unwrap();
        assert_eq!(all.len(), 2);

        c.delete_version("API_KEY", &v1.version).await.unwrap();
        let remaining = c.gets_by_id(series_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].version, v2.version);
    }

    #[tokio::test]
    async fn delete_series_cascades_all_content() {
        let c = controller();
        c.build("Y", b"p".to_vec(), "a").create().await.unwrap();
        c.delete_series("Y").await.unwrap();
        assert!(c.get_by_name_and_version("Y", "").await.unwrap().is_none());
        assert!(c.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_name_is_invalid_input() {
        let c = controller();
        let err = c.build("", b"p".to_vec(), "a").create().await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn name_with_double_dot_is_invalid_input() {
        let c = controller();
        let err = c.build("BAD..NAME", b"p".to_vec(), "a").create().await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn empty_metadata_key_is_invalid_input() {
        let c = controller();
        let mut metadata = HashMap::new();
        metadata.insert(String::new(), "value".to_string());
        let err = c
            .build("DB_Pass", b"p".to_vec(), "a")
            .with_metadata(metadata)
            .create()
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
        assert!(c.list_all().await.unwrap().is_empty());
    }
}
