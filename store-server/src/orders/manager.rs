//! Order manager
//!
//! Single owner of order state transitions. Everything the storefront does
//! to an order goes through here: checkout, status moves, rider dispatch,
//! cancellation. Handlers translate HTTP into these calls and nothing else.

use std::sync::Arc;

use shared::models::{GUEST_USER_ID, Order, OrderStatus, PaymentMethod, UserAccount};
use shared::util::{now_millis, order_id};
use tracing::{error, info, warn};

use super::{CANCELLATION_WINDOW_MS, CancellationReceipt, Checkout, CheckoutReceipt, OrderError};
use crate::catalog::CatalogService;
use crate::db::{OrderRepository, RepoError, UserRepository};
use crate::marketing::loyalty;
use crate::notify::{Notification, NotifyQueue};
use crate::payment::{PaymentGateway, PaymentOutcome};
use crate::pricing::{CartTotals, CouponEngine};

/// Attempts at drawing an unused order id before giving up
const ID_DRAW_ATTEMPTS: u32 = 8;

pub struct OrderManager {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
    catalog: Arc<CatalogService>,
    coupons: CouponEngine,
    gateway: Arc<dyn PaymentGateway>,
    notify: NotifyQueue,
}

impl OrderManager {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        catalog: Arc<CatalogService>,
        gateway: Arc<dyn PaymentGateway>,
        notify: NotifyQueue,
    ) -> Self {
        let coupons = CouponEngine::new(catalog.clone());
        Self {
            orders,
            users,
            catalog,
            coupons,
            gateway,
            notify,
        }
    }

    // ========== Checkout ==========

    /// Create an order from a checkout.
    ///
    /// Pricing is recomputed server-side from the submitted items; the
    /// client's displayed totals are never trusted. Online payment is
    /// charged exactly once, before anything is persisted.
    pub async fn create(&self, checkout: Checkout) -> Result<CheckoutReceipt, OrderError> {
        // idempotency: a repeated key replays the original order
        if let Some(key) = &checkout.idempotency_key
            && let Some(existing_id) = self.orders.find_checkout_key(key).await?
        {
            let order = self
                .orders
                .find_by_id(&existing_id)
                .await?
                .ok_or_else(|| OrderError::NotFound(existing_id.clone()))?;
            info!(order_id = %order.id, key = %key, "Checkout replayed via idempotency key");
            return Ok(CheckoutReceipt {
                order,
                payment_reference: None,
                replayed: true,
            });
        }

        if checkout.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        for item in &checkout.items {
            if item.quantity < 1 {
                return Err(OrderError::InvalidItem(format!(
                    "{}: quantity must be at least 1",
                    item.product_id
                )));
            }
            if item.price <= 0 {
                return Err(OrderError::InvalidItem(format!(
                    "{}: price must be positive",
                    item.product_id
                )));
            }
        }

        let subtotal: i64 = checkout.items.iter().map(|i| i.line_total()).sum();

        let discount = match &checkout.coupon_code {
            Some(code) => self.coupons.apply(code, subtotal)?.discount,
            None => 0,
        };

        let surcharge = match &checkout.delivery_slot_id {
            Some(slot_id) => {
                self.catalog
                    .slot(slot_id)
                    .ok_or_else(|| OrderError::UnknownSlot(slot_id.clone()))?
                    .surcharge
            }
            None => 0,
        };

        let totals = CartTotals::compute(subtotal, discount, surcharge);

        // loyalty: redeemed points are capped by balance and by the total
        let is_guest = checkout.user_id == GUEST_USER_ID;
        let account = self.load_account(&checkout, is_guest).await?;
        let redeemed = checkout.points_to_redeem;
        if redeemed > totals.grand_total {
            return Err(OrderError::RedeemExceedsTotal {
                grand_total: totals.grand_total,
            });
        }

        let charged = totals.grand_total - redeemed;

        // charge before persisting; a declined payment leaves no trace
        let payment_reference = match checkout.payment_method {
            PaymentMethod::Online => match self.gateway.charge(charged).await {
                PaymentOutcome::Approved { reference } => Some(reference),
                PaymentOutcome::Declined { reason } => {
                    warn!(user_id = %checkout.user_id, charged, %reason, "Checkout payment declined");
                    return Err(OrderError::PaymentDeclined(reason));
                }
            },
            PaymentMethod::Cod => None,
        };

        let earned = if is_guest { 0 } else { loyalty::points_earned(charged) };

        let order = Order {
            id: self.allocate_id().await?,
            user_id: checkout.user_id.clone(),
            created_at: now_millis(),
            total: charged,
            status: OrderStatus::Processing,
            items: checkout.items,
            payment_method: checkout.payment_method,
            address: checkout.address,
            customer_name: checkout.customer_name,
            customer_phone: checkout.customer_phone,
            delivery_slot_id: checkout.delivery_slot_id,
            coupon_code: checkout.coupon_code,
            rider_id: None,
            rider_name: None,
            points_redeemed: redeemed,
            points_earned: earned,
        };

        self.orders.insert(order.clone()).await?;
        if let Some(key) = &checkout.idempotency_key {
            self.orders.record_checkout_key(key, &order.id).await?;
        }

        if let Some(account) = account {
            let balance = loyalty::settle_checkout(account.points_balance, redeemed, earned);
            self.users.update_points(&account.id, balance).await?;
        }

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            charged,
            redeemed,
            earned,
            "Order created"
        );
        self.notify.enqueue_all(Notification::order_placed(&order));

        Ok(CheckoutReceipt {
            order,
            payment_reference,
            replayed: false,
        })
    }

    /// Resolve the loyalty account and validate the redemption against it.
    /// Guests have no account and must not redeem.
    async fn load_account(
        &self,
        checkout: &Checkout,
        is_guest: bool,
    ) -> Result<Option<UserAccount>, OrderError> {
        if is_guest {
            if checkout.points_to_redeem != 0 {
                return Err(OrderError::GuestRedeem);
            }
            return Ok(None);
        }

        let account = self
            .users
            .find_by_id(&checkout.user_id)
            .await?
            .ok_or_else(|| OrderError::UnknownUser(checkout.user_id.clone()))?;

        if checkout.points_to_redeem > account.points_balance {
            return Err(OrderError::InsufficientPoints {
                available: account.points_balance,
            });
        }
        Ok(Some(account))
    }

    /// Draw "GB-" ids until one is free
    async fn allocate_id(&self) -> Result<String, OrderError> {
        for _ in 0..ID_DRAW_ATTEMPTS {
            let id = order_id();
            if !self.orders.id_exists(&id).await? {
                return Ok(id);
            }
        }
        Err(OrderError::Repo(RepoError::Storage(
            "order id space exhausted".into(),
        )))
    }

    // ========== Lifecycle ==========

    /// Move an order to a forward state. Cancelled orders are immutable;
    /// forward jumps (Processing straight to Delivered) are allowed.
    pub async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        if status == OrderStatus::Cancelled {
            return Err(OrderError::CancelNotAStatus);
        }

        let mut order = self.fetch(id).await?;
        if order.status == OrderStatus::Cancelled {
            return Err(OrderError::CancelledImmutable);
        }
        if order.status == status {
            return Ok(order);
        }

        order.status = status;
        if status == OrderStatus::Delivered
            && let Some(rider_id) = &order.rider_id
        {
            self.catalog.release_rider(rider_id);
        }
        self.orders.save(order.clone()).await?;

        info!(order_id = %order.id, status = ?status, "Order status updated");
        self.notify.enqueue(Notification::status_changed(&order, status));
        Ok(order)
    }

    /// Dispatch a rider: check-and-set on availability, then the order
    /// moves to out-for-delivery.
    pub async fn assign_rider(&self, id: &str, rider_id: &str) -> Result<Order, OrderError> {
        let mut order = self.fetch(id).await?;
        if order.status.is_terminal() {
            return Err(OrderError::OrderInactive(order.id));
        }

        let rider = self.catalog.claim_rider(rider_id, &order.id)?;
        let previous = order.rider_id.take();

        order.rider_id = Some(rider.id.clone());
        order.rider_name = Some(rider.name.clone());
        order.status = OrderStatus::OutForDelivery;
        if let Err(e) = self.orders.save(order.clone()).await {
            // the claim must not outlive a failed save
            self.catalog.release_rider(&rider.id);
            return Err(e.into());
        }

        // reassignment frees the previous rider once the new one is recorded
        if let Some(previous) = previous.as_deref()
            && previous != rider.id
        {
            self.catalog.release_rider(previous);
        }

        info!(order_id = %order.id, rider_id = %rider.id, rider = %rider.name, "Rider assigned");
        self.notify
            .enqueue(Notification::status_changed(&order, OrderStatus::OutForDelivery));
        Ok(order)
    }

    /// Cancel an order inside the window.
    ///
    /// The window check runs first so a late attempt reports expiry even if
    /// the order has also moved on. Loyalty is reversed using exactly the
    /// amounts recorded on the order. Items and totals stay untouched.
    pub async fn cancel(
        &self,
        id: &str,
        requester_id: &str,
        is_admin: bool,
    ) -> Result<CancellationReceipt, OrderError> {
        let mut order = self.fetch(id).await?;
        if order.user_id != requester_id && !is_admin {
            return Err(OrderError::NotOwner);
        }

        // elapsed == 5:00 is still inside the window
        if now_millis() - order.created_at > CANCELLATION_WINDOW_MS {
            return Err(OrderError::WindowExpired);
        }
        if order.status != OrderStatus::Processing {
            return Err(OrderError::NotCancellable(order.status));
        }

        // reverse loyalty before the cancellation is persisted; if the save
        // then fails the balance is rolled back, so a retry starts from an
        // order that is still Processing and a ledger that still matches it
        let account = if order.user_id == GUEST_USER_ID {
            None
        } else {
            self.users.find_by_id(&order.user_id).await?
        };
        if let Some(account) = &account {
            let balance = loyalty::reverse_cancellation(
                account.points_balance,
                order.points_redeemed,
                order.points_earned,
            );
            self.users.update_points(&account.id, balance).await?;
        }

        order.status = OrderStatus::Cancelled;
        if let Err(e) = self.orders.save(order.clone()).await {
            if let Some(account) = &account
                && let Err(rollback) = self
                    .users
                    .update_points(&account.id, account.points_balance)
                    .await
            {
                error!(
                    order_id = %order.id,
                    user_id = %account.id,
                    error = %rollback,
                    "Loyalty rollback failed after cancellation save error"
                );
            }
            return Err(e.into());
        }

        if let Some(rider_id) = &order.rider_id {
            self.catalog.release_rider(rider_id);
        }

        info!(order_id = %order.id, user_id = %order.user_id, "Order cancelled");
        self.notify.enqueue_all(Notification::cancelled(&order));

        let refund_note = match order.payment_method {
            PaymentMethod::Online => {
                Some("Your refund will be processed within 3 days.".to_string())
            }
            PaymentMethod::Cod => None,
        };
        Ok(CancellationReceipt { order, refund_note })
    }

    // ========== Queries ==========

    pub async fn get(
        &self,
        id: &str,
        requester_id: &str,
        is_admin: bool,
    ) -> Result<Order, OrderError> {
        let order = self.fetch(id).await?;
        if order.user_id != requester_id && !is_admin {
            return Err(OrderError::NotOwner);
        }
        Ok(order)
    }

    /// Own orders, newest first; admins see everything
    pub async fn list_for(
        &self,
        requester_id: &str,
        is_admin: bool,
    ) -> Result<Vec<Order>, OrderError> {
        let orders = if is_admin {
            self.orders.find_all().await?
        } else {
            self.orders.find_by_user(requester_id).await?
        };
        Ok(orders)
    }

    async fn fetch(&self, id: &str) -> Result<Order, OrderError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, RepoResult};
    use crate::notify::WhatsAppDispatcher;
    use crate::payment::FixedOutcomeGateway;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared::models::{LineItem, RiderStatus};

    fn manager_with(gateway: FixedOutcomeGateway) -> (OrderManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let manager = OrderManager::new(
            store.clone(),
            store.clone(),
            Arc::new(CatalogService::seeded()),
            Arc::new(gateway),
            NotifyQueue::start(Arc::new(WhatsAppDispatcher)),
        );
        (manager, store)
    }

    /// MemoryStore wrapper that fails the next N saves or points updates
    struct FaultyStore {
        inner: Arc<MemoryStore>,
        failing_saves: Mutex<u32>,
        failing_points_updates: Mutex<u32>,
    }

    impl FaultyStore {
        fn new(inner: Arc<MemoryStore>) -> Self {
            Self {
                inner,
                failing_saves: Mutex::new(0),
                failing_points_updates: Mutex::new(0),
            }
        }

        fn take_fault(counter: &Mutex<u32>) -> bool {
            let mut remaining = counter.lock();
            if *remaining > 0 {
                *remaining -= 1;
                true
            } else {
                false
            }
        }
    }

    #[async_trait]
    impl OrderRepository for FaultyStore {
        async fn insert(&self, order: Order) -> RepoResult<()> {
            self.inner.insert(order).await
        }

        async fn save(&self, order: Order) -> RepoResult<()> {
            if Self::take_fault(&self.failing_saves) {
                return Err(RepoError::Storage("injected save failure".into()));
            }
            self.inner.save(order).await
        }

        async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
            OrderRepository::find_by_id(self.inner.as_ref(), id).await
        }

        async fn find_all(&self) -> RepoResult<Vec<Order>> {
            self.inner.find_all().await
        }

        async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
            self.inner.find_by_user(user_id).await
        }

        async fn id_exists(&self, id: &str) -> RepoResult<bool> {
            self.inner.id_exists(id).await
        }

        async fn find_checkout_key(&self, key: &str) -> RepoResult<Option<String>> {
            self.inner.find_checkout_key(key).await
        }

        async fn record_checkout_key(&self, key: &str, order_id: &str) -> RepoResult<()> {
            self.inner.record_checkout_key(key, order_id).await
        }
    }

    #[async_trait]
    impl UserRepository for FaultyStore {
        async fn find_by_id(&self, id: &str) -> RepoResult<Option<UserAccount>> {
            UserRepository::find_by_id(self.inner.as_ref(), id).await
        }

        async fn upsert(&self, user: UserAccount) -> RepoResult<()> {
            self.inner.upsert(user).await
        }

        async fn update_points(&self, user_id: &str, balance: i64) -> RepoResult<()> {
            if Self::take_fault(&self.failing_points_updates) {
                return Err(RepoError::Storage("injected points failure".into()));
            }
            self.inner.update_points(user_id, balance).await
        }
    }

    fn faulty_manager() -> (OrderManager, Arc<FaultyStore>, Arc<CatalogService>) {
        let store = Arc::new(FaultyStore::new(Arc::new(MemoryStore::new())));
        let catalog = Arc::new(CatalogService::seeded());
        let manager = OrderManager::new(
            store.clone(),
            store.clone(),
            catalog.clone(),
            Arc::new(FixedOutcomeGateway::approving()),
            NotifyQueue::start(Arc::new(WhatsAppDispatcher)),
        );
        (manager, store, catalog)
    }

    async fn seed_user(store: &MemoryStore, id: &str, points: i64) {
        store
            .upsert(UserAccount {
                id: id.into(),
                name: "Asha".into(),
                email: format!("{id}@example.com"),
                phone: Some("9000000000".into()),
                is_admin: false,
                points_balance: points,
                wallet_balance: 0,
            })
            .await
            .unwrap();
    }

    fn checkout(user_id: &str, quantity: u32) -> Checkout {
        Checkout {
            user_id: user_id.into(),
            items: vec![LineItem {
                product_id: "p2".into(),
                name: "Tomato".into(),
                selected_unit: "1kg".into(),
                price: 40,
                quantity,
            }],
            payment_method: PaymentMethod::Cod,
            address: "12 Lake Road".into(),
            customer_name: "Asha".into(),
            customer_phone: "9000000000".into(),
            delivery_slot_id: None,
            coupon_code: None,
            points_to_redeem: 0,
            idempotency_key: None,
        }
    }

    #[tokio::test]
    async fn guest_cannot_redeem_points() {
        let (manager, _) = manager_with(FixedOutcomeGateway::approving());
        let mut c = checkout(GUEST_USER_ID, 1);
        c.points_to_redeem = 10;
        assert!(matches!(
            manager.create(c).await,
            Err(OrderError::GuestRedeem)
        ));
    }

    #[tokio::test]
    async fn declined_payment_leaves_no_order() {
        let (manager, store) = manager_with(FixedOutcomeGateway::declining());
        seed_user(&store, "u1", 0).await;

        let mut c = checkout("u1", 2);
        c.payment_method = PaymentMethod::Online;
        assert!(matches!(
            manager.create(c).await,
            Err(OrderError::PaymentDeclined(_))
        ));
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn redeem_beyond_balance_is_rejected() {
        let (manager, store) = manager_with(FixedOutcomeGateway::approving());
        seed_user(&store, "u1", 5).await;

        let mut c = checkout("u1", 2);
        c.points_to_redeem = 10;
        assert!(matches!(
            manager.create(c).await,
            Err(OrderError::InsufficientPoints { available: 5 })
        ));
    }

    #[tokio::test]
    async fn redeem_beyond_total_is_rejected() {
        let (manager, store) = manager_with(FixedOutcomeGateway::approving());
        seed_user(&store, "u1", 500).await;

        let mut c = checkout("u1", 1); // total 40
        c.points_to_redeem = 41;
        assert!(matches!(
            manager.create(c).await,
            Err(OrderError::RedeemExceedsTotal { grand_total: 40 })
        ));
    }

    #[tokio::test]
    async fn cancelled_order_rejects_status_updates() {
        let (manager, store) = manager_with(FixedOutcomeGateway::approving());
        seed_user(&store, "u1", 0).await;

        let receipt = manager.create(checkout("u1", 1)).await.unwrap();
        manager.cancel(&receipt.order.id, "u1", false).await.unwrap();

        assert!(matches!(
            manager
                .update_status(&receipt.order.id, OrderStatus::Packed)
                .await,
            Err(OrderError::CancelledImmutable)
        ));
    }

    #[tokio::test]
    async fn cancel_endpoint_owns_the_cancelled_state() {
        let (manager, store) = manager_with(FixedOutcomeGateway::approving());
        seed_user(&store, "u1", 0).await;

        let receipt = manager.create(checkout("u1", 1)).await.unwrap();
        assert!(matches!(
            manager
                .update_status(&receipt.order.id, OrderStatus::Cancelled)
                .await,
            Err(OrderError::CancelNotAStatus)
        ));
    }

    #[tokio::test]
    async fn failed_reversal_leaves_the_order_cancellable() {
        let (manager, store, _) = faulty_manager();
        seed_user(&store.inner, "u1", 120).await;

        // subtotal 400, redeem 50, earn 5% of 350 = 17
        let mut c = checkout("u1", 10);
        c.points_to_redeem = 50;
        let receipt = manager.create(c).await.unwrap();
        let balance_after_checkout = 120 - 50 + 17;

        *store.failing_points_updates.lock() = 1;
        assert!(matches!(
            manager.cancel(&receipt.order.id, "u1", false).await,
            Err(OrderError::Repo(_))
        ));

        // nothing moved: the order is still Processing, the ledger matches it
        let order = OrderRepository::find_by_id(store.as_ref(), &receipt.order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        let account = UserRepository::find_by_id(store.as_ref(), "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.points_balance, balance_after_checkout);

        // the retry completes the round trip back to the pre-order balance
        manager.cancel(&receipt.order.id, "u1", false).await.unwrap();
        let account = UserRepository::find_by_id(store.as_ref(), "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.points_balance, 120);
    }

    #[tokio::test]
    async fn failed_save_rolls_the_reversal_back() {
        let (manager, store, _) = faulty_manager();
        seed_user(&store.inner, "u1", 120).await;

        let mut c = checkout("u1", 10);
        c.points_to_redeem = 50;
        let receipt = manager.create(c).await.unwrap();

        *store.failing_saves.lock() = 1;
        assert!(matches!(
            manager.cancel(&receipt.order.id, "u1", false).await,
            Err(OrderError::Repo(_))
        ));

        let account = UserRepository::find_by_id(store.as_ref(), "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.points_balance, 120 - 50 + 17);

        manager.cancel(&receipt.order.id, "u1", false).await.unwrap();
        let account = UserRepository::find_by_id(store.as_ref(), "u1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.points_balance, 120);
    }

    #[tokio::test]
    async fn failed_save_releases_the_claimed_rider() {
        let (manager, store, catalog) = faulty_manager();
        seed_user(&store.inner, "u1", 0).await;

        let receipt = manager.create(checkout("u1", 1)).await.unwrap();

        *store.failing_saves.lock() = 1;
        assert!(matches!(
            manager.assign_rider(&receipt.order.id, "r1").await,
            Err(OrderError::Repo(_))
        ));

        // the claim did not leak and the order never left Processing
        let rider = catalog.riders().into_iter().find(|r| r.id == "r1").unwrap();
        assert_eq!(rider.status, RiderStatus::Available);
        let order = OrderRepository::find_by_id(store.as_ref(), &receipt.order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(order.rider_id.is_none());

        manager.assign_rider(&receipt.order.id, "r1").await.unwrap();
    }
}
