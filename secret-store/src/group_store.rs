//! Persistence of `Group` rows. See `client_store` module docs for why this
//! exists alongside the numbered components.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::types::{Group, GroupId};

#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn create(&self, name: &str, description: &str, created_by: &str) -> Result<GroupId, StoreError>;
    async fn get_by_id(&self, id: GroupId) -> Result<Option<Group>, StoreError>;
    async fn get_by_name(&self, name: &str) -> Result<Option<Group>, StoreError>;
    async fn list_all(&self) -> Result<Vec<Group>, StoreError>;
    async fn delete_by_id(&self, id: GroupId) -> Result<(), StoreError>;
}

#[derive(Default)]
struct GroupTable {
    by_id: HashMap<i64, Group>,
    by_name: HashMap<String, i64>,
}

pub struct InMemoryGroupStore {
    table: RwLock<GroupTable>,
    next_id: AtomicI64,
}

impl InMemoryGroupStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(GroupTable::default()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryGroupStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GroupStore for InMemoryGroupStore {
    async fn create(&self, name: &str, description: &str, created_by: &str) -> Result<GroupId, StoreError> {
        let mut table = self.table.write().unwrap();
        if table.by_name.contains_key(name) {
            return Err(StoreError::Conflict(format!("group name {}", name)));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let group = Group {
            id: GroupId(id),
            name: name.to_string(),
            description: description.to_string(),
            created_at: now,
            created_by: created_by.to_string(),
            updated_at: now,
            updated_by: created_by.to_string(),
        };
        table.by_name.insert(name.to_string(), id);
        table.by_id.insert(id, group);
        Ok(GroupId(id))
    }

    async fn get_by_id(&self, id: GroupId) -> Result<Option<Group>, StoreError> {
        Ok(self.table.read().unwrap().by_id.get(&id.0).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Group>, StoreError> {
        let table = self.table.read().unwrap();
        Ok(table.by_name.get(name).and_then(|id| table.by_id.get(id)).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, StoreError> {
        let table = self.table.read().unwrap();
        let mut all: Vec<Group> = table.by_id.values().cloned().collect();
        all.sort_by_key(|g| g.id.0);
        Ok(all)
    }

    async fn delete_by_id(&self, id: GroupId) -> Result<(), StoreError> {
        let mut table = self.table.write().unwrap();
        if let Some(group) = table.by_id.remove(&id.0) {
            table.by_name.remove(&group.name);
        }
        Ok(())
    }
}

#[cfg(feature = "postgres")]
mod pg {
    use super::*;
    use sqlx::{PgPool, Row};

    pub struct PgGroupStore {
        pool: PgPool,
    }

    impl PgGroupStore {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl GroupStore for PgGroupStore {
        async fn create(&self, name: &str, description: &str, created_by: &str) -> Result<GroupId, StoreError> {
            let row = sqlx::query(
                r#"INSERT INTO groups (name, description, "createdAt", "createdBy", "updatedAt", "updatedBy")
                   VALUES ($1, $2, now(), $3, now(), $3) RETURNING id"#,
            )
            .bind(name)
            .bind(description)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Conflict(format!("group name {}", name))
                }
                other => StoreError::Storage(other.to_string()),
            })?;
            Ok(GroupId(row.get::<i64, _>("id")))
        }

        async fn get_by_id(&self, id: GroupId) -> Result<Option<Group>, StoreError> {
            let row = sqlx::query(r#"SELECT * FROM groups WHERE id = $1"#)
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;
            row.map(row_to_group).transpose()
        }

        async fn get_by_name(&self, name: &str) -> Result<Option<Group>, StoreError> {
            let row = sqlx::query(r#"SELECT * FROM groups WHERE name = $1"#)
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
            row.map(row_to_group).transpose()
        }

        async fn list_all(&self) -> Result<Vec<Group>, StoreError> {
            let rows = sqlx::query(r#"SELECT * FROM groups ORDER BY id ASC"#)
                .fetch_all(&self.pool)
                .await?;
            rows.into_iter().map(row_to_group).collect()
        }

        async fn delete_by_id(&self, id: GroupId) -> Result<(), StoreError> {
            sqlx::query(r#"DELETE FROM groups WHERE id = $1"#)
                .bind(id.0)
                .execute(&self.pool)
                .await?;
            Ok(())
        }
    }

    fn row_to_group(row: sqlx::postgres::PgRow) -> Result<Group, StoreError> {
        Ok(Group {
            id: GroupId(row.get("id")),
            name: row.get("name"),
            description: row.try_get("description").unwrap_or_default(),
            created_at: row.get("createdAt"),
            created_by: row.try_get("createdBy").unwrap_or_default(),
            updated_at: row.get("updatedAt"),
            updated_by: row.try_get("updatedBy").unwrap_or_default(),
        })
    }
}

#[cfg(feature = "postgres")]
pub use pg::PgGroupStore;
