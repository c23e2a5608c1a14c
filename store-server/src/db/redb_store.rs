//! redb-based durable store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | JSON `Order` | Order records |
//! | `users` | `user_id` | JSON `UserAccount` | Accounts + loyalty balances |
//! | `wishlist` | `user_id` | JSON `Vec<String>` | Wishlisted product ids |
//! | `processed_checkouts` | `idempotency_key` | `order_id` | Checkout idempotency |
//! | `meta` | `"schema_version"` | `u64` | Store schema version |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: once `commit()` returns the
//! write survives power loss. Values are JSON so a schema bump can migrate
//! them field by field; `schema_version` gates opening a store written by a
//! newer build.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::{Order, UserAccount};
use thiserror::Error;

use super::{OrderRepository, RepoError, RepoResult, UserRepository, WishlistRepository};

const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");
const USERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
const WISHLIST_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("wishlist");
const PROCESSED_CHECKOUTS_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("processed_checkouts");
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");

const SCHEMA_VERSION_KEY: &str = "schema_version";
const SCHEMA_VERSION: u64 = 1;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store schema version {found} is newer than supported {supported}")]
    SchemaTooNew { found: u64, supported: u64 },
}

impl From<StorageError> for RepoError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Serialization(e) => RepoError::Serialization(e),
            other => RepoError::Storage(other.to_string()),
        }
    }
}

/// Durable store backed by redb
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory store (tests)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> Result<Self, StorageError> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(WISHLIST_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_CHECKOUTS_TABLE)?;

            let mut meta = write_txn.open_table(META_TABLE)?;
            let current = meta.get(SCHEMA_VERSION_KEY)?.map(|g| g.value());
            match current {
                None => {
                    meta.insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION)?;
                }
                Some(v) if v > SCHEMA_VERSION => {
                    return Err(StorageError::SchemaTooNew {
                        found: v,
                        supported: SCHEMA_VERSION,
                    });
                }
                Some(_) => {}
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Current schema version recorded in the store
    pub fn schema_version(&self) -> Result<u64, StorageError> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(META_TABLE)?;
        Ok(meta
            .get(SCHEMA_VERSION_KEY)?
            .map(|g| g.value())
            .unwrap_or(0))
    }

    fn put_order(&self, order: &Order) -> Result<(), StorageError> {
        let value = serde_json::to_vec(order)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ORDERS_TABLE)?;
            table.insert(order.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_order(&self, id: &str) -> Result<Option<Order>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    fn all_orders(&self) -> Result<Vec<Order>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            orders.push(serde_json::from_slice::<Order>(value.value())?);
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[async_trait]
impl OrderRepository for RedbStore {
    async fn insert(&self, order: Order) -> RepoResult<()> {
        if self.get_order(&order.id)?.is_some() {
            return Err(RepoError::Duplicate(format!("Order {}", order.id)));
        }
        self.put_order(&order)?;
        Ok(())
    }

    async fn save(&self, order: Order) -> RepoResult<()> {
        if self.get_order(&order.id)?.is_none() {
            return Err(RepoError::NotFound(format!("Order {}", order.id)));
        }
        self.put_order(&order)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        Ok(self.get_order(id)?)
    }

    async fn find_all(&self) -> RepoResult<Vec<Order>> {
        Ok(self.all_orders()?)
    }

    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        let mut orders = self.all_orders()?;
        orders.retain(|o| o.user_id == user_id);
        Ok(orders)
    }

    async fn id_exists(&self, id: &str) -> RepoResult<bool> {
        Ok(self.get_order(id)?.is_some())
    }

    async fn find_checkout_key(&self, key: &str) -> RepoResult<Option<String>> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table = read_txn
            .open_table(PROCESSED_CHECKOUTS_TABLE)
            .map_err(StorageError::from)?;
        let found = table
            .get(key)
            .map_err(StorageError::from)?
            .map(|g| g.value().to_string());
        Ok(found)
    }

    async fn record_checkout_key(&self, key: &str, order_id: &str) -> RepoResult<()> {
        let write_txn = self.db.begin_write().map_err(StorageError::from)?;
        {
            let mut table = write_txn
                .open_table(PROCESSED_CHECKOUTS_TABLE)
                .map_err(StorageError::from)?;
            table.insert(key, order_id).map_err(StorageError::from)?;
        }
        write_txn.commit().map_err(StorageError::from)?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for RedbStore {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<UserAccount>> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table = read_txn.open_table(USERS_TABLE).map_err(StorageError::from)?;
        match table.get(id).map_err(StorageError::from)? {
            Some(guard) => Ok(Some(
                serde_json::from_slice(guard.value()).map_err(StorageError::from)?,
            )),
            None => Ok(None),
        }
    }

    async fn upsert(&self, user: UserAccount) -> RepoResult<()> {
        let value = serde_json::to_vec(&user).map_err(StorageError::from)?;
        let write_txn = self.db.begin_write().map_err(StorageError::from)?;
        {
            let mut table = write_txn.open_table(USERS_TABLE).map_err(StorageError::from)?;
            table
                .insert(user.id.as_str(), value.as_slice())
                .map_err(StorageError::from)?;
        }
        write_txn.commit().map_err(StorageError::from)?;
        Ok(())
    }

    async fn update_points(&self, user_id: &str, balance: i64) -> RepoResult<()> {
        let mut user = UserRepository::find_by_id(self, user_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {user_id}")))?;
        user.points_balance = balance;
        self.upsert(user).await
    }
}

#[async_trait]
impl WishlistRepository for RedbStore {
    async fn list(&self, user_id: &str) -> RepoResult<Vec<String>> {
        let read_txn = self.db.begin_read().map_err(StorageError::from)?;
        let table = read_txn
            .open_table(WISHLIST_TABLE)
            .map_err(StorageError::from)?;
        match table.get(user_id).map_err(StorageError::from)? {
            Some(guard) => Ok(serde_json::from_slice(guard.value()).map_err(StorageError::from)?),
            None => Ok(Vec::new()),
        }
    }

    async fn add(&self, user_id: &str, product_id: &str) -> RepoResult<bool> {
        let mut list = self.list(user_id).await?;
        if list.iter().any(|p| p == product_id) {
            return Ok(false);
        }
        list.push(product_id.to_string());
        self.write_wishlist(user_id, &list)?;
        Ok(true)
    }

    async fn remove(&self, user_id: &str, product_id: &str) -> RepoResult<bool> {
        let mut list = self.list(user_id).await?;
        let before = list.len();
        list.retain(|p| p != product_id);
        if list.len() == before {
            return Ok(false);
        }
        self.write_wishlist(user_id, &list)?;
        Ok(true)
    }
}

impl RedbStore {
    fn write_wishlist(&self, user_id: &str, list: &[String]) -> Result<(), StorageError> {
        let value = serde_json::to_vec(list)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(WISHLIST_TABLE)?;
            table.insert(user_id, value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
