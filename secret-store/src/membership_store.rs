//! C6 — MembershipStore: client↔group and group↔series edges.

use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{ClientId, GroupId, SeriesId};

/// Idempotent set-algebra operations over the two membership relations
/// (spec.md §4.6). All mutations execute within a single transaction so
/// invariant 4 holds even under concurrent modification.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn enroll(&self, client_id: ClientId, group_id: GroupId) -> Result<(), StoreError>;
    async fn evict(&self, client_id: ClientId, group_id: GroupId) -> Result<(), StoreError>;

    async fn allow(&self, series_id: SeriesId, group_id: GroupId) -> Result<(), StoreError>;
    async fn disallow(&self, series_id: SeriesId, group_id: GroupId) -> Result<(), StoreError>;

    async fn clients_of(&self, group_id: GroupId) -> Result<Vec<ClientId>, StoreError>;
    async fn groups_of_client(&self, client_id: ClientId) -> Result<Vec<GroupId>, StoreError>;
    async fn series_of(&self, group_id: GroupId) -> Result<Vec<SeriesId>, StoreError>;
    async fn groups_of_series(&self, series_id: SeriesId) -> Result<Vec<GroupId>, StoreError>;

    async fn remove_client(&self, client_id: ClientId) -> Result<(), StoreError>;
    async fn remove_group(&self, group_id: GroupId) -> Result<(), StoreError>;
    async fn remove_series(&self, series_id: SeriesId) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MembershipTables {
    client_in_group: HashSet<(i64, i64)>,
    series_in_group: HashSet<(i64, i64)>,
}

pub struct InMemoryMembershipStore {
    tables: RwLock<MembershipTables>,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(MembershipTables::default()),
        }
    }
}

impl Default for InMemoryMembershipStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn enroll(&self, client_id: ClientId, group_id: GroupId) -> Result<(), StoreError> {
        self.tables.write().unwrap().client_in_group.insert((client_id.0, group_id.0));
        Ok(())
    }

    async fn evict(&self, client_id: ClientId, group_id: GroupId) -> Result<(), StoreError> {
        self.tables.write().unwrap().client_in_group.remove(&(client_id.0, group_id.0));
        Ok(())
    }

    async fn allow(&self, series_id: SeriesId, group_id: GroupId) -> Result<(), StoreError> {
        self.tables.write().unwrap().series_in_group.insert((series_id.0, group_id.0));
        Ok(())
    }

    async fn disallow(&self, series_id: SeriesId, group_id: GroupId) -> Result<(), StoreError> {
        self.tables.write().unwrap().series_in_group.remove(&(series_id.0, group_id.0));
        Ok(())
    }

    async fn clients_of(&self, group_id: GroupId) -> Result<Vec<ClientId>, StoreError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .client_in_group
            .iter()
            .filter(|(_, g)| *g == group_id.0)
            .map(|(c, _)| ClientId(*c))
            .collect())
    }

    async fn groups_of_client(&self, client_id: ClientId) -> Result<Vec<GroupId>, StoreError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .client_in_group
            .iter()
            .filter(|(c, _)| *c == client_id.0)
            .map(|(_, g)| GroupId(*g))
            .collect())
    }

    async fn series_of(&self, group_id: GroupId) -> Result<Vec<SeriesId>, StoreError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .series_in_group
            .iter()
            .filter(|(_, g)| *g == group_id.0)
            .map(|(s, _)| SeriesId(*s))
            .collect())
    }

    async fn groups_of_series(&self, series_id: SeriesId) -> Result<Vec<GroupId>, StoreError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .series_in_group
            .iter()
            .filter(|(s, _)| *s == series_id.0)
            .map(|(_, g)| GroupId(*g))
            .collect())
    }

    async fn remove_client(&self, client_id: ClientId) -> Result<(), StoreError> {
        self.tables.write().unwrap().client_in_group.retain(|(c, _)| *c != client_id.0);
        Ok(())
    }

    async fn remove_group(&self, group_id: GroupId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().unwrap();
        tables.client_in_group.retain(|(_, g)| *g != group_id.0);
        tables.series_in_group.retain(|(_, g)| *g != group_id.0);
        Ok(())
    }

    async fn remove_series(&self, series_id: SeriesId) -> Result<(), StoreError> {
        self.tables.write().unwrap().series_in_group.retain(|(s, _)| *s != series_id.0);
        Ok(())
    }
}

#[cfg(feature = "postgres")]
mod pg {
    use super::*;
    use sqlx::{PgPool, Row};

    /// `sqlx::PgPool`-backed implementation of `memberships`/`accessgrants`.
    pub struct PgMembershipStore {
        pool: PgPool,
    }

    impl PgMembershipStore {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl MembershipStore for PgMembershipStore {
        async fn enroll(&self, client_id: ClientId, group_id: GroupId) -> Result<(), StoreError> {
            sqlx::query(
                r#"INSERT INTO memberships ("clientId", "groupId") VALUES ($1, $2)
                   ON CONFLICT DO NOTHING"#,
            )
            .bind(client_id.0)
            .bind(group_id.0)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn evict(&self, client_id: ClientId, group_id: GroupId) -> Result<(), StoreError> {
            sqlx::query(r#"DELETE FROM memberships WHERE "clientId" = $1 AND "groupId" = $2"#)
                .bind(client_id.0)
                .bind(group_id.0)
                .execute(&self.pool)
                .await?;
            Ok(())
        }

        async fn allow(&self, series_id: SeriesId, group_id: GroupId) -> Result<(), StoreError> {
            sqlx::query(
                r#"INSERT INTO accessgrants ("groupId", "secretId") VALUES ($1, $2)
                   ON CONFLICT DO NOTHING"#,
            )
            .bind(group_id.0)
            .bind(series_id.0)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn disallow(&self, series_id: SeriesId, group_id: GroupId) -> Result<(), StoreError> {
            sqlx::query(r#"DELETE FROM accessgrants WHERE "groupId" = $1 AND "secretId" = $2"#)
                .bind(group_id.0)
                .bind(series_id.0)
                .execute(&self.pool)
                .await?;
            Ok(())
        }

        async fn clients_of(&self, group_id: GroupId) -> Result<Vec<ClientId>, StoreError> {
            let rows = sqlx::query(r#"SELECT "clientId" FROM memberships WHERE "groupId" = $1"#)
                .bind(group_id.0)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(|r| ClientId(r.get("clientId"))).collect())
        }

        async fn groups_of_client(&self, client_id: ClientId) -> Result<Vec<GroupId>, StoreError> {
            let rows = sqlx::query(r#"SELECT "groupId" FROM memberships WHERE "clientId" = $1"#)
                .bind(client_id.0)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(|r| GroupId(r.get("groupId"))).collect())
        }

        async fn series_of(&self, group_id: GroupId) -> Result<Vec<SeriesId>, StoreError> {
            let rows = sqlx::query(r#"SELECT "secretId" FROM accessgrants WHERE "groupId" = $1"#)
                .bind(group_id.0)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(|r| SeriesId(r.get("secretId"))).collect())
        }

        async fn groups_of_series(&self, series_id: SeriesId) -> Result<Vec<GroupId>, StoreError> {
            let rows = sqlx::query(r#"SELECT "groupId" FROM accessgrants WHERE "secretId" = $1"#)
                .bind(series_id.0)
                .fetch_all(&self.pool)
                .await?;
            Ok(rows.into_iter().map(|r| GroupId(r.get("groupId"))).collect())
        }

        async fn remove_client(&self, client_id: ClientId) -> Result<(), StoreError> {
            sqlx::query(r#"DELETE FROM memberships WHERE "clientId" = $1"#)
                .bind(client_id.0)
                .execute(&self.pool)
                .await?;
            Ok(())
        }

        async fn remove_group(&self, group_id: GroupId) -> Result<(), StoreError> {
            let mut tx = self.pool.begin().await?;
            sqlx::query(r#"DELETE FROM memberships WHERE "groupId" = $1"#)
                .bind(group_id.0)
                .execute(&mut *tx)
                .await?;
            sqlx::query(r#"DELETE FROM accessgrants WHERE "groupId" = $1"#)
                .bind(group_id.0)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok(())
        }

        async fn remove_series(&self, series_id: SeriesId) -> Result<(), StoreError> {
            sqlx::query(r#"DELETE FROM accessgrants WHERE "secretId" = $1"#)
                .bind(series_id.0)
                .execute(&self.pool)
                .await?;
            Ok(())
        }
    }
}

#[cfg(feature = "postgres")]
pub use pg::PgMembershipStore;
