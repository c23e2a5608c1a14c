//! In-memory store
//!
//! Backs tests and the demo profile. Same last-writer-wins semantics as
//! the durable store; no cross-store coordination.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::{Order, UserAccount};

use super::{OrderRepository, RepoError, RepoResult, UserRepository, WishlistRepository};

/// In-memory implementation of all repository traits
#[derive(Default)]
pub struct MemoryStore {
    orders: RwLock<HashMap<String, Order>>,
    users: RwLock<HashMap<String, UserAccount>>,
    wishlists: RwLock<HashMap<String, Vec<String>>>,
    checkout_keys: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert(&self, order: Order) -> RepoResult<()> {
        let mut orders = self.orders.write();
        if orders.contains_key(&order.id) {
            return Err(RepoError::Duplicate(format!("Order {}", order.id)));
        }
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn save(&self, order: Order) -> RepoResult<()> {
        let mut orders = self.orders.write();
        if !orders.contains_key(&order.id) {
            return Err(RepoError::NotFound(format!("Order {}", order.id)));
        }
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        Ok(self.orders.read().get(id).cloned())
    }

    async fn find_all(&self) -> RepoResult<Vec<Order>> {
        Ok(newest_first(self.orders.read().values().cloned().collect()))
    }

    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        Ok(newest_first(
            self.orders
                .read()
                .values()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn id_exists(&self, id: &str) -> RepoResult<bool> {
        Ok(self.orders.read().contains_key(id))
    }

    async fn find_checkout_key(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.checkout_keys.read().get(key).cloned())
    }

    async fn record_checkout_key(&self, key: &str, order_id: &str) -> RepoResult<()> {
        self.checkout_keys
            .write()
            .insert(key.to_string(), order_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<UserAccount>> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn upsert(&self, user: UserAccount) -> RepoResult<()> {
        self.users.write().insert(user.id.clone(), user);
        Ok(())
    }

    async fn update_points(&self, user_id: &str, balance: i64) -> RepoResult<()> {
        let mut users = self.users.write();
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| RepoError::NotFound(format!("User {user_id}")))?;
        user.points_balance = balance;
        Ok(())
    }
}

#[async_trait]
impl WishlistRepository for MemoryStore {
    async fn list(&self, user_id: &str) -> RepoResult<Vec<String>> {
        Ok(self
            .wishlists
            .read()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add(&self, user_id: &str, product_id: &str) -> RepoResult<bool> {
        let mut wishlists = self.wishlists.write();
        let list = wishlists.entry(user_id.to_string()).or_default();
        if list.iter().any(|p| p == product_id) {
            return Ok(false);
        }
        list.push(product_id.to_string());
        Ok(true)
    }

    async fn remove(&self, user_id: &str, product_id: &str) -> RepoResult<bool> {
        let mut wishlists = self.wishlists.write();
        let Some(list) = wishlists.get_mut(user_id) else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|p| p != product_id);
        Ok(list.len() != before)
    }
}
