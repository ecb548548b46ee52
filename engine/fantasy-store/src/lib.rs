//! # Fantasy Store
//!
//! Document-store access for the fantasy companion. Callers construct a store
//! handle explicitly from [`StoreConfig`] and pass it to whatever needs
//! database access; there is no global client.
//!
//! - **DocumentStore**: async trait over schema-on-write collections
//! - **InMemoryStore**: process-local backend for tests and dry runs
//! - **LocalStore**: one JSON file per collection under a data directory
//! - **WriteBatch**: all-or-nothing group of set/delete operations
//!
//! ```rust
//! use fantasy_store::{Collection, DocumentStore, InMemoryStore, StoreExt, WriteBatch};
//!
//! #[tokio::main]
//! async fn main() -> fantasy_store::Result<()> {
//!     let store = InMemoryStore::new();
//!     let mut batch = WriteBatch::new();
//!     batch.set(Collection::Users, "u1", &serde_json::json!({"display_name": "Khabib"}))?;
//!     store.commit(batch).await?;
//!
//!     let user: Option<serde_json::Value> = store.get_doc(Collection::Users, "u1").await?;
//!     assert!(user.is_some());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod batch;
pub mod config;
pub mod documents;
pub mod error;

pub use backend::{DocumentStore, InMemoryStore, LocalStore, StoreExt};
pub use batch::{Collection, WriteBatch, WriteOp};
pub use config::{open_store, AdminCredentials, StoreBackend, StoreConfig};
pub use documents::*;
pub use error::{Result, StoreError};
