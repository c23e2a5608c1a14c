//! Repository Module
//!
//! Storage seams for the checkout core. The core depends only on these
//! traits; [`MemoryStore`] backs tests and demos, [`RedbStore`] is the
//! durable embedded store.

pub mod memory;
pub mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use async_trait::async_trait;
use shared::models::{Order, UserAccount};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Order persistence.
///
/// Orders are never physically deleted; `save` overwrites the record under
/// its id (last writer wins, see the concurrency notes in the readme).
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a new order. Fails with `Duplicate` if the id exists.
    async fn insert(&self, order: Order) -> RepoResult<()>;

    /// Overwrite an existing order record.
    async fn save(&self, order: Order) -> RepoResult<()>;

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>>;

    /// All orders, newest first.
    async fn find_all(&self) -> RepoResult<Vec<Order>>;

    /// Orders for one user, newest first.
    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>>;

    /// True if the order id is already taken (id allocation re-draw).
    async fn id_exists(&self, id: &str) -> RepoResult<bool>;

    /// Look up the order created under a checkout idempotency key.
    async fn find_checkout_key(&self, key: &str) -> RepoResult<Option<String>>;

    /// Record a processed checkout idempotency key.
    async fn record_checkout_key(&self, key: &str, order_id: &str) -> RepoResult<()>;
}

/// User account persistence (loyalty balances live here).
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<UserAccount>>;

    async fn upsert(&self, user: UserAccount) -> RepoResult<()>;

    /// Persist a new points balance. Fails with `NotFound` for unknown users.
    async fn update_points(&self, user_id: &str, balance: i64) -> RepoResult<()>;
}

/// Per-user wishlist (product ids, insertion order preserved).
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    async fn list(&self, user_id: &str) -> RepoResult<Vec<String>>;

    /// Returns false if the product was already present.
    async fn add(&self, user_id: &str, product_id: &str) -> RepoResult<bool>;

    /// Returns false if the product was not present.
    async fn remove(&self, user_id: &str, product_id: &str) -> RepoResult<bool>;
}
