//! C4 — SecretContentStore: persistence of content revisions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::types::{ContentId, SecretContent, SeriesId};

/// Persistence of content revisions (ciphertext + version) keyed by series.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fails with `StoreError::Conflict` if `(series_id, version)` already exists.
    async fn create(
        &self,
        series_id: SeriesId,
        encrypted_content: String,
        version: String,
        created_by: String,
    ) -> Result<ContentId, StoreError>;

    async fn get_by_id(&self, id: ContentId) -> Result<Option<SecretContent>, StoreError>;

    /// Ordered by id ascending.
    async fn list_by_series(&self, series_id: SeriesId) -> Result<Vec<SecretContent>, StoreError>;

    /// Each distinct version, including `""`.
    async fn versions_of(&self, series_id: SeriesId) -> Result<Vec<String>, StoreError>;

    async fn delete_by_series(&self, series_id: SeriesId) -> Result<(), StoreError>;

    async fn delete_by_series_and_version(
        &self,
        series_id: SeriesId,
        version: &str,
    ) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ContentTable {
    by_id: HashMap<i64, SecretContent>,
    /// (series_id, version) -> content id, enforcing invariant 2.
    by_series_version: HashMap<(i64, String), i64>,
}

pub struct InMemoryContentStore {
    table: RwLock<ContentTable>,
    next_id: AtomicI64,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(ContentTable::default()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn create(
        &self,
        series_id: SeriesId,
        encrypted_content: String,
        version: String,
        created_by: String,
    ) -> Result<ContentId, StoreError> {
        let mut table = self.table.write().unwrap();
        let key = (series_id.0, version.clone());
        if table.by_series_version.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "series {} version {:?}",
                series_id, version
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let content = SecretContent {
            id: ContentId(id),
            secret_series_id: series_id,
            encrypted_content,
            version: version.clone(),
            created_at: now,
            created_by: created_by.clone(),
            updated_at: now,
            updated_by: created_by,
        };
        table.by_series_version.insert((series_id.0, version), id);
        table.by_id.insert(id, content);
        Ok(ContentId(id))
    }

    async fn get_by_id(&self, id: ContentId) -> Result<Option<SecretContent>, StoreError> {
        Ok(self.table.read().unwrap().by_id.get(&id.0).cloned())
    }

    async fn list_by_series(&self, series_id: SeriesId) -> Result<Vec<SecretContent>, StoreError> {
        let table = self.table.read().unwrap();
        let mut rows: Vec<SecretContent> = table
            .by_id
            .values()
            .filter(|c| c.secret_series_id == series_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.id.0);
        Ok(rows)
    }

    async fn versions_of(&self, series_id: SeriesId) -> Result<Vec<String>, StoreError> {
        let table = self.table.read().unwrap();
        let mut versions: Vec<String> = table
            .by_series_version
            .keys()
            .filter(|(sid, _)| *sid == series_id.0)
            .map(|(_, v)| v.clone())
            .collect();
        versions.sort();
        Ok(versions)
    }

    async fn delete_by_series(&self, series_id: SeriesId) -> Result<(), StoreError> {
        let mut table = self.table.write().unwrap();
        table.by_id.retain(|_, c| c.secret_series_id != series_id);
        table.by_series_version.retain(|(sid, _), _| *sid != series_id.0);
        Ok(())
    }

    async fn delete_by_series_and_version(
        &self,
        series_id: SeriesId,
        version: &str,
    ) -> Result<(), StoreError> {
        let mut table = self.table.write().unwrap();
        if let Some(id) = table.by_series_version.remove(&(series_id.0, version.to_string())) {
            table.by_id.remove(&id);
        }
        Ok(())
    }
}

#[cfg(feature = "postgres")]
mod pg {
    use super::*;
    use sqlx::{PgPool, Row};

    /// `sqlx::PgPool`-backed implementation of the `secrets_content` table.
    pub struct PgContentStore {
        pool: PgPool,
    }

    impl PgContentStore {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl ContentStore for PgContentStore {
        async fn create(
            &self,
            series_id: SeriesId,
            encrypted_content: String,
            version: String,
            created_by: String,
        ) -> Result<ContentId, StoreError> {
            let row = sqlx::query(
                r#"INSERT INTO secrets_content
                     ("secretId", encrypted_content, version, "createdAt", "createdBy", "updatedAt", "updatedBy")
                   VALUES ($1, $2, $3, now(), $4, now(), $4)
                   RETURNING id"#,
            )
            .bind(series_id.0)
            .bind(&encrypted_content)
            .bind(&version)
            .bind(&created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Conflict(format!("series {} version {:?}", series_id, version))
                }
                other => StoreError::Storage(other.to_string()),
            })?;
            Ok(ContentId(row.get::<i64, _>("id")))
        }

        async fn get_by_id(&self, id: ContentId) -> Result<Option<SecretContent>, StoreError> {
            let row = sqlx::query(r#"SELECT * FROM secrets_content WHERE id = $1"#)
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;
            row.map(row_to_content).transpose()
        }

        async fn list_by_series(&self, series_id: SeriesId) -> Result<Vec<SecretContent>, StoreError> {
            let rows = sqlx::query(
                r#"SELECT * FROM secrets_content WHERE "secretId" = $1 ORDER BY id ASC"#,
            )
            .bind(series_id.0)
            .fetch_all(&self.pool)
            .await?;
            rows.into_iter().map(row_to_content).collect()
        }

        async fn versions_of(&self, series_id: SeriesId) -> Result<Vec<String>, StoreError> {
            let rows = sqlx::query(
                r#"SELECT DISTINCT version FROM secrets_content WHERE "secretId" = $1 ORDER BY version"#,
            )
            .bind(series_id.0)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows.into_iter().map(|r| r.get("version")).collect())
        }

        async fn delete_by_series(&self, series_id: SeriesId) -> Result<(), StoreError> {
            sqlx::query(r#"DELETE FROM secrets_content WHERE "secretId" = $1"#)
                .bind(series_id.0)
                .execute(&self.pool)
                .await?;
            Ok(())
        }

        async fn delete_by_series_and_version(
            &self,
            series_id: SeriesId,
            version: &str,
        ) -> Result<(), StoreError> {
            sqlx::query(r#"DELETE FROM secrets_content WHERE "secretId" = $1 AND version = $2"#)
                .bind(series_id.0)
                .bind(version)
                .execute(&self.pool)
                .await?;
            Ok(())
        }
    }

    fn row_to_content(row: sqlx::postgres::PgRow) -> Result<SecretContent, StoreError> {
        Ok(SecretContent {
            id: ContentId(row.get("id")),
            secret_series_id: SeriesId(row.get("secretId")),
            encrypted_content: row.get("encrypted_content"),
            version: row.get("version"),
            created_at: row.get("createdAt"),
            created_by: row.try_get("createdBy").unwrap_or_default(),
            updated_at: row.get("updatedAt"),
            updated_by: row.try_get("updatedBy").unwrap_or_default(),
        })
    }
}

#[cfg(feature = "postgres")]
pub use pg::PgContentStore;
