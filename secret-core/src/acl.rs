//! C7 — AclEngine: the bipartite-graph authorization predicate and its
//! derived read queries.

use std::sync::Arc;

use secret_envelope::Cryptographer;
use secret_store::types::{Client, ClientId, Group, SeriesId};
use secret_store::{ClientStore, ContentStore, GroupStore, MembershipStore, SeriesStore};

use crate::error::CoreError;
use crate::sanitizer::{sanitize, SanitizedSecret};
use crate::secret::Secret;

/// Answers "which secrets may client X see?" and "which clients/groups see
/// secret Y?" via `mayAccess(client, series) ⇔ ∃ g : ClientInGroup(client,
/// g) ∧ SeriesInGroup(series, g)` (spec.md §4.7).
pub struct AclEngine<SS, CS, MS, CL, GR> {
    series_store: Arc<SS>,
    content_store: Arc<CS>,
    membership_store: Arc<MS>,
    client_store: Arc<CL>,
    group_store: Arc<GR>,
    crypto: Arc<Cryptographer>,
}

impl<SS, CS, MS, CL, GR> AclEngine<SS, CS, MS, CL, GR>
where
    SS: SeriesStore,
    CS: ContentStore,
    MS: MembershipStore,
    CL: ClientStore,
    GR: GroupStore,
{
    pub fn new(
        series_store: Arc<SS>,
        content_store: Arc<CS>,
        membership_store: Arc<MS>,
        client_store: Arc<CL>,
        group_store: Arc<GR>,
        crypto: Arc<Cryptographer>,
    ) -> Self {
        Self {
            series_store,
            content_store,
            membership_store,
            client_store,
            group_store,
            crypto,
        }
    }

    /// `mayAccess(client, series)`.
    pub async fn may_access(&self, client_id: ClientId, series_id: SeriesId) -> Result<bool, CoreError> {
        let client_groups = self.membership_store.groups_of_client(client_id).await?;
        for group in client_groups {
            let series_in_group = self.membership_store.series_of(group).await?;
            if series_in_group.contains(&series_id) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Union over the client's groups of each group's series, each joined
    /// with its latest content row. A secret appears at most once.
    pub async fn secrets_for(&self, client_id: ClientId) -> Result<Vec<SanitizedSecret>, CoreError> {
        let groups = self.membership_store.groups_of_client(client_id).await?;
        let mut series_ids = Vec::new();
        for group in groups {
            for sid in self.membership_store.series_of(group).await? {
                if !series_ids.contains(&sid) {
                    series_ids.push(sid);
                }
            }
        }

        let mut out = Vec::with_capacity(series_ids.len());
        for series_id in series_ids {
            if let Some(secret) = self.latest_secret(series_id).await? {
                out.push(sanitize(&secret)?);
            }
        }
        Ok(out)
    }

    /// Groups linked to the secret's series.
    pub async fn groups_for(&self, series_id: SeriesId) -> Result<Vec<Group>, CoreError> {
        let group_ids = self.membership_store.groups_of_series(series_id).await?;
        let mut groups = Vec::with_capacity(group_ids.len());
        for id in group_ids {
            if let Some(group) = self.group_store.get_by_id(id).await? {
                groups.push(group);
            }
        }
        Ok(groups)
    }

    /// Distinct clients reachable via any group linked to the secret's series.
    pub async fn clients_for(&self, series_id: SeriesId) -> Result<Vec<Client>, CoreError> {
        let group_ids = self.membership_store.groups_of_series(series_id).await?;
        let mut client_ids = Vec::new();
        for group_id in group_ids {
            for cid in self.membership_store.clients_of(group_id).await? {
                if !client_ids.contains(&cid) {
                    client_ids.push(cid);
                }
            }
        }
        let mut clients = Vec::with_capacity(client_ids.len());
        for id in client_ids {
            if let Some(client) = self.client_store.get_by_id(id).await? {
                clients.push(client);
            }
        }
        Ok(clients)
    }

    /// Applies the access predicate first; returns `None` on deny so that a
    /// caller cannot distinguish "absent" from "present but forbidden"
    /// (spec.md §4.7, §7 anti-enumeration policy).
    pub async fn get_secret_for_client(
        &self,
        client_id: ClientId,
        name: &str,
    ) -> Result<Option<Secret>, CoreError> {
        let series = match self.series_store.get_by_name(name).await? {
            Some(series) => series,
            None => return Ok(None),
        };
        if !self.may_access(client_id, series.id).await? {
            return Ok(None);
        }
        self.latest_secret(series.id).await
    }

    /// Latest = highest content id; ties broken by created-at (spec.md §4.7,
    /// the content-id tiebreak frozen by spec.md §9's open question).
    async fn latest_secret(&self, series_id: SeriesId) -> Result<Option<Secret>, CoreError> {
        let series = match self.series_store.get_by_id(series_id).await? {
            Some(series) => series,
            None => return Ok(None),
        };
        let mut contents = self.content_store.list_by_series(series_id).await?;
        contents.sort_by(|a, b| a.id.as_i64().cmp(&b.id.as_i64()).then(a.created_at.cmp(&b.created_at)));
        let latest = match contents.into_iter().next_back() {
            Some(content) => content,
            None => return Ok(None),
        };
        Ok(Some(Secret::new(
            series.id,
            latest.id,
            series.name,
            series.description,
            latest.version,
            series.r#type,
            series.generation_options,
            series.metadata,
            latest.created_at,
            latest.created_by,
            latest.updated_at,
            latest.updated_by,
            latest.encrypted_content,
        )))
    }

    pub fn crypto(&self) -> &Cryptographer {
        &self.crypto
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secret_envelope::RootKey;
    use secret_store::types::NewSeries;
    use secret_store::{InMemoryClientStore, InMemoryContentStore, InMemoryGroupStore, InMemoryMembershipStore, InMemorySeriesStore};

    type TestAcl = AclEngine<InMemorySeriesStore, InMemoryContentStore, InMemoryMembershipStore, InMemoryClientStore, InMemoryGroupStore>;

    async fn setup() -> (TestAcl, ClientId, SeriesId) {
        let series_store = Arc::new(InMemorySeriesStore::new());
        let content_store = Arc::new(InMemoryContentStore::new());
        let membership_store = Arc::new(InMemoryMembershipStore::new());
        let client_store = Arc::new(InMemoryClientStore::new());
        let group_store = Arc::new(InMemoryGroupStore::new());
        let crypto = Arc::new(Cryptographer::new(RootKey::new("kid-1", [3u8; 32])));

        let client_id = client_store.create("shuttle", "", true, "admin").await.unwrap();
        let group_id = group_store.create("Ops", "", "admin").await.unwrap();
        let series_id = series_store
            .create_series(NewSeries { name: "DB_Pass".into(), created_by: "admin".into(), ..Default::default() })
            .await
            .unwrap();
        membership_store.enroll(client_id, group_id).await.unwrap();
        membership_store.allow(series_id, group_id).await.unwrap();

        let envelope = crypto.encrypt("DB_Pass", b"hunter2").unwrap();
        content_store.create(series_id, envelope, "".into(), "admin".into()).await.unwrap();

        (
            AclEngine::new(series_store, content_store, membership_store, client_store, group_store, crypto),
            client_id,
            series_id,
        )
    }

    #[tokio::test]
    async fn may_access_true_through_shared_group() {
        let (acl, client_id, series_id) = setup().await;
        assert!(acl.may_access(client_id, series_id).await.unwrap());
    }

    #[tokio::test]
    async fn may_access_false_without_shared_group() {
        let (acl, _client_id, series_id) = setup().await;
        assert!(!acl.may_access(ClientId(999), series_id).await.unwrap());
    }

    #[tokio::test]
    async fn get_secret_for_client_returns_plaintext() {
        let (acl, client_id, _series_id) = setup().await;
        let secret = acl.get_secret_for_client(client_id, "DB_Pass").await.unwrap().unwrap();
        assert_eq!(secret.plaintext(acl.crypto()).unwrap(), b"hunter2");
    }

    #[tokio::test]
    async fn get_secret_for_client_denies_without_access() {
        let (acl, _client_id, _series_id) = setup().await;
        assert!(acl.get_secret_for_client(ClientId(999), "DB_Pass").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_secret_for_client_is_none_for_absent_name() {
        let (acl, client_id, _series_id) = setup().await;
        assert!(acl.get_secret_for_client(client_id, "Nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn secrets_for_lists_accessible_secrets_once() {
        let (acl, client_id, _series_id) = setup().await;
        let secrets = acl.secrets_for(client_id).await.unwrap();
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].name, "DB_Pass");
    }
}
