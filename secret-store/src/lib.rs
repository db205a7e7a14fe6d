//! # secret-store
//!
//! Persistence layer for the secret storage core: secret series (C3),
//! content revisions (C4), client/group membership edges (C6), and the
//! configuration (C10) that wires a process to a root key and a database.
//!
//! Every store is a trait with two implementations: an `InMemory*` backend
//! guarded by `std::sync::RwLock`, used for tests and for embedding without
//! a database, and (behind the `postgres` feature) a `Pg*` backend against
//! the schema in spec.md §6.
//!
//! ```
//! use secret_store::{InMemorySeriesStore, SeriesStore, types::NewSeries};
//!
//! # tokio_test::block_on(async {
//! let store = InMemorySeriesStore::new();
//! let id = store.create_series(NewSeries {
//!     name: "DB_PASSWORD".to_string(),
//!     created_by: "admin".to_string(),
//!     ..Default::default()
//! }).await.unwrap();
//! assert!(store.get_by_id(id).await.unwrap().is_some());
//! # });
//! ```

pub mod client_store;
pub mod config;
pub mod content_store;
pub mod error;
pub mod group_store;
pub mod membership_store;
pub mod series_store;
pub mod types;

pub use client_store::{ClientStore, InMemoryClientStore};
pub use config::{Config, ConfigError, RootKeyConfig};
pub use content_store::{ContentStore, InMemoryContentStore};
pub use error::StoreError;
pub use group_store::{GroupStore, InMemoryGroupStore};
pub use membership_store::{InMemoryMembershipStore, MembershipStore};
pub use series_store::{InMemorySeriesStore, SeriesStore};

#[cfg(feature = "postgres")]
pub use client_store::PgClientStore;
#[cfg(feature = "postgres")]
pub use content_store::PgContentStore;
#[cfg(feature = "postgres")]
pub use group_store::PgGroupStore;
#[cfg(feature = "postgres")]
pub use membership_store::PgMembershipStore;
#[cfg(feature = "postgres")]
pub use series_store::PgSeriesStore;
