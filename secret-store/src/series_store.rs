//! C3 — SecretSeriesStore: persistence of secret series metadata.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::types::{NewSeries, SecretSeries, SeriesId};

/// Persistence of secret series metadata: name, description, metadata map,
/// creator/updater, timestamps.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Fails with `StoreError::Conflict` if `name` already exists, or
    /// `StoreError::InvalidInput` if a metadata key is empty or
    /// non-printable.
    async fn create_series(&self, new: NewSeries) -> Result<SeriesId, StoreError>;

    async fn get_by_id(&self, id: SeriesId) -> Result<Option<SecretSeries>, StoreError>;

    async fn get_by_name(&self, name: &str) -> Result<Option<SecretSeries>, StoreError>;

    /// Stable order by id.
    async fn list_all(&self) -> Result<Vec<SecretSeries>, StoreError>;

    /// Used by `SecretController` to roll back a freshly-created series when
    /// the subsequent content insert fails (spec.md §4.5).
    async fn delete_by_id(&self, id: SeriesId) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SeriesTable {
    by_id: HashMap<i64, SecretSeries>,
    by_name: HashMap<String, i64>,
}

/// `RwLock`-guarded in-memory implementation, for tests and for embedding
/// without a database.
pub struct InMemorySeriesStore {
    table: RwLock<SeriesTable>,
    next_id: AtomicI64,
}

impl InMemorySeriesStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(SeriesTable::default()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemorySeriesStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeriesStore for InMemorySeriesStore {
    async fn create_series(&self, new: NewSeries) -> Result<SeriesId, StoreError> {
        crate::types::validate_metadata_keys(&new.metadata)?;
        let mut table = self.table.write().unwrap();
        if table.by_name.contains_key(&new.name) {
            return Err(StoreError::Conflict(format!("series name {}", new.name)));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let series = SecretSeries {
            id: SeriesId(id),
            name: new.name.clone(),
            description: new.description,
            created_at: now,
            created_by: new.created_by.clone(),
            updated_at: now,
            updated_by: new.created_by,
            r#type: new.r#type,
            generation_options: new.generation_options,
            metadata: new.metadata,
        };
        table.by_name.insert(new.name, id);
        table.by_id.insert(id, series);
        Ok(SeriesId(id))
    }

    async fn get_by_id(&self, id: SeriesId) -> Result<Option<SecretSeries>, StoreError> {
        Ok(self.table.read().unwrap().by_id.get(&id.0).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<SecretSeries>, StoreError> {
        let table = self.table.read().unwrap();
        Ok(table.by_name.get(name).and_then(|id| table.by_id.get(id)).cloned())
    }

    async fn list_all(&self) -> Result<Vec<SecretSeries>, StoreError> {
        let table = self.table.read().unwrap();
        let mut all: Vec<SecretSeries> = table.by_id.values().cloned().collect();
        all.sort_by_key(|s| s.id.0);
        Ok(all)
    }

    async fn delete_by_id(&self, id: SeriesId) -> Result<(), StoreError> {
        let mut table = self.table.write().unwrap();
        if let Some(series) = table.by_id.remove(&id.0) {
            table.by_name.remove(&series.name);
        }
        Ok(())
    }
}

#[cfg(feature = "postgres")]
mod pg {
    use super::*;
    use sqlx::{PgPool, Row};

    /// `sqlx::PgPool`-backed implementation of the `secrets` table (spec.md §6).
    pub struct PgSeriesStore {
        pool: PgPool,
    }

    impl PgSeriesStore {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl SeriesStore for PgSeriesStore {
        async fn create_series(&self, new: NewSeries) -> Result<SeriesId, StoreError> {
            crate::types::validate_metadata_keys(&new.metadata)?;
            let options = serde_json::to_value(&new.generation_options)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let metadata = serde_json::to_value(&new.metadata)
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let row = sqlx::query(
                r#"INSERT INTO secrets
                     (name, description, "createdAt", "createdBy", "updatedAt", "updatedBy", type, options, metadata)
                   VALUES ($1, $2, now(), $3, now(), $3, $4, $5, $6)
                   RETURNING id"#,
            )
            .bind(&new.name)
            .bind(&new.description)
            .bind(&new.created_by)
            .bind(&new.r#type)
            .bind(&options)
            .bind(&metadata)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Conflict(format!("series name {}", new.name))
                }
                other => StoreError::Storage(other.to_string()),
            })?;
            Ok(SeriesId(row.get::<i64, _>("id")))
        }

        async fn get_by_id(&self, id: SeriesId) -> Result<Option<SecretSeries>, StoreError> {
            let row = sqlx::query(r#"SELECT * FROM secrets WHERE id = $1"#)
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;
            row.map(row_to_series).transpose()
        }

        async fn get_by_name(&self, name: &str) -> Result<Option<SecretSeries>, StoreError> {
            let row = sqlx::query(r#"SELECT * FROM secrets WHERE name = $1"#)
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
            row.map(row_to_series).transpose()
        }

        async fn list_all(&self) -> Result<Vec<SecretSeries>, StoreError> {
            let rows = sqlx::query(r#"SELECT * FROM secrets ORDER BY id ASC"#)
                .fetch_all(&self.pool)
                .await?;
            rows.into_iter().map(row_to_series).collect()
        }

        async fn delete_by_id(&self, id: SeriesId) -> Result<(), StoreError> {
            let mut tx = self.pool.begin().await?;
            sqlx::query(r#"DELETE FROM secrets WHERE id = $1"#)
                .bind(id.0)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(())
        }
    }

    fn row_to_series(row: sqlx::postgres::PgRow) -> Result<SecretSeries, StoreError> {
        let options: serde_json::Value = row.get("options");
        let metadata: serde_json::Value = row.get("metadata");
        Ok(SecretSeries {
            id: SeriesId(row.get("id")),
            name: row.get("name"),
            description: row.try_get("description").unwrap_or_default(),
            created_at: row.get("createdAt"),
            created_by: row.try_get("createdBy").unwrap_or_default(),
            updated_at: row.get("updatedAt"),
            updated_by: row.try_get("updatedBy").unwrap_or_default(),
            r#type: row.try_get("type").ok(),
            generation_options: serde_json::from_value(options).unwrap_or_default(),
            metadata: serde_json::from_value(metadata).unwrap_or_default(),
        })
    }
}

#[cfg(feature = "postgres")]
pub use pg::PgSeriesStore;

#[cfg(test)]
mod tests {
    use super::*;

    fn new_series(name: &str) -> NewSeries {
        NewSeries {
            name: name.to_string(),
            created_by: "admin".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_then_get_by_name_and_id() {
        let store = InMemorySeriesStore::new();
        let id = store.create_series(new_series("DB_Pass")).await.unwrap();
        let by_name = store.get_by_name("DB_Pass").await.unwrap().unwrap();
        assert_eq!(by_name.id, id);
        let by_id = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "DB_Pass");
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let store = InMemorySeriesStore::new();
        store.create_series(new_series("X")).await.unwrap();
        let err = store.create_series(new_series("X")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn empty_metadata_key_is_invalid_input() {
        let store = InMemorySeriesStore::new();
        let mut new = new_series("Z");
        new.metadata.insert(String::new(), "v".to_string());
        let err = store.create_series(new).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(store.get_by_name("Z").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_by_id_is_idempotent() {
        let store = InMemorySeriesStore::new();
        store.delete_by_id(SeriesId(999)).await.unwrap();
        let id = store.create_series(new_series("Y")).await.unwrap();
        store.delete_by_id(id).await.unwrap();
        store.delete_by_id(id).await.unwrap();
        assert!(store.get_by_name("Y").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_all_is_ordered_by_id() {
        let store = InMemorySeriesStore::new();
        store.create_series(new_series("A")).await.unwrap();
        store.create_series(new_series("B")).await.unwrap();
        store.create_series(new_series("C")).await.unwrap();
        let all = store.list_all().await.unwrap();
        let ids: Vec<i64> = all.iter().map(|s| s.id.0).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
