//! Persistence of `Client` rows (spec.md §3). Not an independently numbered
//! component in spec.md's table, but required ambient persistence for C6/C7
//! to resolve edge endpoints to full entities; follows the same
//! store-trait-plus-two-backends shape as `SeriesStore`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::types::{Client, ClientId};

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn create(&self, name: &str, description: &str, automation: bool, created_by: &str) -> Result<ClientId, StoreError>;
    async fn get_by_id(&self, id: ClientId) -> Result<Option<Client>, StoreError>;
    async fn get_by_name(&self, name: &str) -> Result<Option<Client>, StoreError>;
    async fn list_all(&self) -> Result<Vec<Client>, StoreError>;
    async fn delete_by_id(&self, id: ClientId) -> Result<(), StoreError>;
}

#[derive(Default)]
struct ClientTable {
    by_id: HashMap<i64, Client>,
    by_name: HashMap<String, i64>,
}

pub struct InMemoryClientStore {
    table: RwLock<ClientTable>,
    next_id: AtomicI64,
}

impl InMemoryClientStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(ClientTable::default()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryClientStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientStore for InMemoryClientStore {
    async fn create(&self, name: &str, description: &str, automation: bool, created_by: &str) -> Result<ClientId, StoreError> {
        let mut table = self.table.write().unwrap();
        if table.by_name.contains_key(name) {
            return Err(StoreError::Conflict(format!("client name {}", name)));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let client = Client {
            id: ClientId(id),
            name: name.to_string(),
            description: description.to_string(),
            created_at: now,
            created_by: created_by.to_string(),
            updated_at: now,
            updated_by: created_by.to_string(),
            automation,
        };
        table.by_name.insert(name.to_string(), id);
        table.by_id.insert(id, client);
        Ok(ClientId(id))
    }

    async fn get_by_id(&self, id: ClientId) -> Result<Option<Client>, StoreError> {
        Ok(self.table.read().unwrap().by_id.get(&id.0).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Client>, StoreError> {
        let table = self.table.read().unwrap();
        Ok(table.by_name.get(name).and_then(|id| table.by_id.get(id)).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Client>, StoreError> {
        let table = self.table.read().unwrap();
        let mut all: Vec<Client> = table.by_id.values().cloned().collect();
        all.sort_by_key(|c| c.id.0);
        Ok(all)
    }

    async fn delete_by_id(&self, id: ClientId) -> Result<(), StoreError> {
        let mut table = self.table.write().unwrap();
        if let Some(client) = table.by_id.remove(&id.0) {
            table.by_name.remove(&client.name);
        }
        Ok(())
    }
}

#[cfg(feature = "postgres")]
mod pg {
    use super::*;
    use sqlx::{PgPool, Row};

    pub struct PgClientStore {
        pool: PgPool,
    }

    impl PgClientStore {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl ClientStore for PgClientStore {
        async fn create(&self, name: &str, description: &str, automation: bool, created_by: &str) -> Result<ClientId, StoreError> {
            let row = sqlx::query(
                r#"INSERT INTO clients (name, description, "createdAt", "createdBy", "updatedAt", "updatedBy", automation)
                   VALUES ($1, $2, now(), $3, now(), $3, $4) RETURNING id"#,
            )
            .bind(name)
            .bind(description)
            .bind(created_by)
            .bind(automation)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Conflict(format!("client name {}", name))
                }
                other => StoreError::Storage(other.to_string()),
            })?;
            Ok(ClientId(row.get::<i64, _>("id")))
        }

        async fn get_by_id(&self, id: ClientId) -> Result<Option<Client>, StoreError> {
            let row = sqlx::query(r#"SELECT * FROM clients WHERE id = $1"#)
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;
            row.map(row_to_client).transpose()
        }

        async fn get_by_name(&self, name: &str) -> Result<Option<Client>, StoreError> {
            let row = sqlx::query(r#"SELECT * FROM clients WHERE name = $1"#)
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
            row.map(row_to_client).transpose()
        }

        async fn list_all(&self) -> Result<Vec<Client>, StoreError> {
            let rows = sqlx::query(r#"SELECT * FROM clients ORDER BY id ASC"#)
                .fetch_all(&self.pool)
                .await?;
            rows.into_iter().map(row_to_client).collect()
        }

        async fn delete_by_id(&self, id: ClientId) -> Result<(), StoreError> {
            sqlx::query(r#"DELETE FROM clients WHERE id = $1"#)
                .bind(id.0)
                .execute(&self.pool)
                .await?;
            Ok(())
        }
    }

    fn row_to_client(row: sqlx::postgres::PgRow) -> Result<Client, StoreError> {
        Ok(Client {
            id: ClientId(row.get("id")),
            name: row.get("name"),
            description: row.try_get("description").unwrap_or_default(),
            created_at: row.get("createdAt"),
            created_by: row.try_get("createdBy").unwrap_or_default(),
            updated_at: row.get("updatedAt"),
            updated_by: row.try_get("updatedBy").unwrap_or_default(),
            automation: row.get("automation"),
        })
    }
}

#[cfg(feature = "postgres")]
pub use pg::PgClientStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_lookup_by_name() {
        let store = InMemoryClientStore::new();
        let id = store.create("shuttle", "", true, "admin").await.unwrap();
        let client = store.get_by_name("shuttle").await.unwrap().unwrap();
        assert_eq!(client.id, id);
        assert!(client.automation);
    }

    #[tokio::test]
    async fn duplicate_name_conflicts() {
        let store = InMemoryClientStore::new();
        store.create("dup", "", false, "a").await.unwrap();
        assert!(matches!(
            store.create("dup", "", false, "a").await.unwrap_err(),
            StoreError::Conflict(_)
        ));
    }
}
