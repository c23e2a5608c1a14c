//! Server state
//!
//! [`ServerState`] holds a shared handle to every service. Cloning is an
//! `Arc` bump; handlers take it as axum state.

use std::sync::Arc;
use std::time::Duration;

use shared::models::{GUEST_USER_ID, UserAccount};
use tracing::info;

use crate::catalog::CatalogService;
use crate::core::Config;
use crate::db::{MemoryStore, OrderRepository, RedbStore, UserRepository, WishlistRepository};
use crate::invoice::{InvoiceRenderer, TextInvoiceRenderer};
use crate::notify::{NotifyQueue, WhatsAppDispatcher};
use crate::orders::OrderManager;
use crate::payment::{PaymentGateway, SimulatedGateway};
use crate::pricing::{CartService, CouponEngine};

/// Shared service handles
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub catalog: Arc<CatalogService>,
    pub carts: Arc<CartService>,
    pub orders: Arc<OrderManager>,
    pub users: Arc<dyn UserRepository>,
    pub wishlist: Arc<dyn WishlistRepository>,
    pub invoices: Arc<dyn InvoiceRenderer>,
}

impl ServerState {
    /// Initialize against the durable store under `WORK_DIR/database`
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let db_dir = config.database_dir();
        std::fs::create_dir_all(&db_dir)?;
        let store = Arc::new(RedbStore::open(db_dir.join("store.redb"))?);
        info!(path = %db_dir.join("store.redb").display(), "Database opened");

        let gateway = Arc::new(SimulatedGateway::new(
            Duration::from_millis(config.payment_delay_ms),
            config.payment_success_rate,
        ));

        Self::assemble(
            config.clone(),
            store.clone(),
            store.clone(),
            store,
            gateway,
        )
        .await
    }

    /// In-memory state for tests: volatile store, instant approving gateway
    pub async fn in_memory() -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(SimulatedGateway::new(Duration::ZERO, 1.0));
        Self::assemble(
            Config::from_env(),
            store.clone(),
            store.clone(),
            store,
            gateway,
        )
        .await
    }

    async fn assemble(
        config: Config,
        orders_repo: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        wishlist: Arc<dyn WishlistRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> anyhow::Result<Self> {
        seed_accounts(users.as_ref()).await?;

        let catalog = Arc::new(CatalogService::seeded());
        let carts = Arc::new(CartService::new(CouponEngine::new(catalog.clone())));
        let notify = NotifyQueue::start(Arc::new(WhatsAppDispatcher));
        let orders = Arc::new(OrderManager::new(
            orders_repo,
            users.clone(),
            catalog.clone(),
            gateway,
            notify,
        ));

        Ok(Self {
            config,
            catalog,
            carts,
            orders,
            users,
            wishlist,
            invoices: Arc::new(TextInvoiceRenderer),
        })
    }
}

/// Demo accounts, created once; existing balances survive restarts
async fn seed_accounts(users: &dyn UserRepository) -> anyhow::Result<()> {
    let seeds = [
        UserAccount {
            id: "admin".into(),
            name: "Store Admin".into(),
            email: "admin@greenbasket.example".into(),
            phone: Some("8513028892".into()),
            is_admin: true,
            points_balance: 0,
            wallet_balance: 0,
        },
        UserAccount {
            id: "u1".into(),
            name: "Asha Sharma".into(),
            email: "asha@example.com".into(),
            phone: Some("9000000000".into()),
            is_admin: false,
            points_balance: 120,
            wallet_balance: 0,
        },
    ];

    for account in seeds {
        debug_assert_ne!(account.id, GUEST_USER_ID);
        if users.find_by_id(&account.id).await?.is_none() {
            info!(user_id = %account.id, "Seeding demo account");
            users.upsert(account).await?;
        }
    }
    Ok(())
}
