//! # secret-core
//!
//! Composes `secret-envelope` (C1 Cryptographer, C2 VersionStamp) and
//! `secret-store` (C3/C4/C6) into the secret storage and access-control
//! core: `SecretController` (C5), `AclEngine` (C7), `AuthPrincipal` (C8),
//! and `Sanitizer` (C9).
//!
//! ```
//! use std::sync::Arc;
//! use secret_core::SecretController;
//! use secret_envelope::{Cryptographer, RootKey};
//! use secret_store::{InMemoryContentStore, InMemorySeriesStore};
//!
//! # tokio_test::block_on(async {
//! let crypto = Arc::new(Cryptographer::new(RootKey::new("kid-1", [0u8; 32])));
//! let controller = SecretController::new(
//!     Arc::new(InMemorySeriesStore::new()),
//!     Arc::new(InMemoryContentStore::new()),
//!     crypto,
//! );
//! let secret = controller.build("DB_PASSWORD", b"hunter2".to_vec(), "admin").create().await.unwrap();
//! assert_eq!(secret.name, "DB_PASSWORD");
//! # });
//! ```

pub mod acl;
pub mod bootstrap;
pub mod controller;
pub mod display_name;
pub mod error;
pub mod principal;
pub mod sanitizer;
pub mod secret;

pub use acl::AclEngine;
pub use bootstrap::cryptographer_from_config;
pub use controller::{SecretBuilder, SecretController};
pub use display_name::{display_name, parse_display_name};
pub use error::CoreError;
pub use principal::AuthPrincipal;
pub use sanitizer::{sanitize, SanitizedSecret};
pub use secret::Secret;

#[cfg(test)]
mod scenario_tests {
    //! End-to-end scenarios A-F (spec.md §8), wired against the in-memory
    //! backends.

    use std::sync::Arc;

    use secret_envelope::{Cryptographer, RootKey};
    use secret_store::types::NewSeries;
    use secret_store::{
        ClientStore, GroupStore, InMemoryClientStore, InMemoryContentStore,
        InMemoryGroupStore, InMemoryMembershipStore, InMemorySeriesStore, MembershipStore,
    };

    use crate::acl::AclEngine;
    use crate::controller::SecretController;
    use crate::error::CoreError;

    type Acl = AclEngine<InMemorySeriesStore, InMemoryContentStore, InMemoryMembershipStore, InMemoryClientStore, InMemoryGroupStore>;
    type Controller = SecretController<InMemorySeriesStore, InMemoryContentStore>;

    struct Harness {
        controller: Controller,
        acl: Acl,
        client_store: Arc<InMemoryClientStore>,
        group_store: Arc<InMemoryGroupStore>,
        membership_store: Arc<InMemoryMembershipStore>,
    }

    fn harness() -> Harness {
        let series_store = Arc::new(InMemorySeriesStore::new());
        let content_store = Arc::new(InMemoryContentStore::new());
        let membership_store = Arc::new(InMemoryMembershipStore::new());
        let client_store = Arc::new(InMemoryClientStore::new());
        let group_store = Arc::new(InMemoryGroupStore::new());
        let crypto = Arc::new(Cryptographer::new(RootKey::new("kid-1", [42u8; 32])));

        let controller = SecretController::new(series_store.clone(), content_store.clone(), crypto.clone());
        let acl = AclEngine::new(series_store, content_store, membership_store.clone(), client_store.clone(), group_store.clone(), crypto);

        Harness { controller, acl, client_store, group_store, membership_store }
    }

    #[tokio::test]
    async fn scenario_a_create_and_read() {
        let h = harness();
        let client_id = h.client_store.create("shuttle", "", true, "admin").await.unwrap();
        let group_id = h.group_store.create("Ops", "", "admin").await.unwrap();
        let secret = h.controller.build("DB_Pass", b"hunter2".to_vec(), "admin").create().await.unwrap();

        h.membership_store.enroll(client_id, group_id).await.unwrap();
        h.membership_store.allow(secret.series_id, group_id).await.unwrap();

        let fetched = h.acl.get_secret_for_client(client_id, "DB_Pass").await.unwrap().unwrap();
        assert_eq!(fetched.plaintext(h.acl.crypto()).unwrap(), b"hunter2");
        assert_eq!(fetched.decoded_length().unwrap(), 7);
    }

    #[tokio::test]
    async fn scenario_b_access_denial_indistinguishable_from_absence() {
        let h = harness();
        let client_id = h.client_store.create("shuttle", "", true, "admin").await.unwrap();
        h.controller.build("DB_Pass", b"hunter2".to_vec(), "admin").create().await.unwrap();
        // no `allow` edge installed

        assert!(h.acl.get_secret_for_client(client_id, "DB_Pass").await.unwrap().is_none());
        assert!(h.acl.get_secret_for_client(client_id, "Nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn scenario_c_versioned_coexistence() {
        let h = harness();
        let v1 = h.controller.build("API_KEY", b"v1data".to_vec(), "a").auto_version().create().await.unwrap();
        let v2 = h.controller.build("API_KEY", b"v2data".to_vec(), "a").auto_version().create().await.unwrap();

        let all = h.controller.gets_by_id(v1.series_id).await.unwrap();
        let mut versions: Vec<String> = all.iter().map(|s| s.version.clone()).collect();
        versions.sort();
        let mut expected = vec![v1.version.clone(), v2.version.clone()];
        expected.sort();
        assert_eq!(versions, expected);

        // latest by id returns v2data
        let latest = all.iter().max_by_key(|s| s.content_id.as_i64()).unwrap();
        assert_eq!(latest.plaintext(h.acl.crypto()).unwrap(), b"v2data");

        h.controller.delete_version("API_KEY", &v1.version).await.unwrap();
        let remaining = h.controller.gets_by_id(v1.series_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].version, v2.version);
        assert!(h.controller.get_by_name_and_version("API_KEY", &v2.version).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn scenario_d_cross_series_ciphertext_attack() {
        let h = harness();
        let secret_a = h.controller.build("SERIES_A", b"a-data".to_vec(), "a").create().await.unwrap();
        h.controller.build("SERIES_B", b"b-data".to_vec(), "a").create().await.unwrap();

        // overwrite B's content row with A's ciphertext, then fetch B
        let stolen_ciphertext = secret_a.encrypted_content().to_string();
        let result = h.acl.crypto().decrypt("SERIES_B", &stolen_ciphertext);

        let err: CoreError = result.unwrap_err().into();
        assert!(matches!(err, CoreError::CryptoIntegrity(_)));
    }

    #[tokio::test]
    async fn scenario_e_rename_is_rejected() {
        // No rename operation exists on SecretController; deleting and
        // recreating under a new name is the only supported path, and old
        // ciphertext under the old name never silently decrypts under the
        // new one.
        let h = harness();
        h.controller.build("OLD_NAME", b"secret-data".to_vec(), "a").create().await.unwrap();
        h.controller.delete_series("OLD_NAME").await.unwrap();
        h.controller.build("NEW_NAME", b"secret-data".to_vec(), "a").create().await.unwrap();

        let new_secret = h.controller.get_by_name_and_version("NEW_NAME", "").await.unwrap().unwrap();
        assert_eq!(new_secret.plaintext(h.acl.crypto()).unwrap(), b"secret-data");
        assert!(h.acl.crypto().decrypt("OLD_NAME", new_secret.encrypted_content()).is_err());
    }

    #[tokio::test]
    async fn scenario_f_conflict_on_duplicate() {
        let h = harness();
        h.controller.build("X", b"p".to_vec(), "a").create().await.unwrap();
        let err = h.controller.build("X", b"p".to_vec(), "a").create().await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(h.controller.list_all().await.unwrap().len(), 1);
    }
}
