//! End-to-end order lifecycle scenarios over the in-memory store

use std::sync::Arc;

use shared::models::{
    GUEST_USER_ID, LineItem, OrderStatus, PaymentMethod, RiderStatus, UserAccount,
};
use store_server::CatalogService;
use store_server::db::{MemoryStore, OrderRepository, UserRepository};
use store_server::notify::{Audience, NotifyQueue, RecordingDispatcher, TemplateKind};
use store_server::orders::{CANCELLATION_WINDOW_MS, Checkout, OrderError, OrderManager};
use store_server::payment::FixedOutcomeGateway;

struct Fixture {
    manager: OrderManager,
    store: Arc<MemoryStore>,
    catalog: Arc<CatalogService>,
    recorder: Arc<RecordingDispatcher>,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(CatalogService::seeded());
    let recorder = Arc::new(RecordingDispatcher::default());
    let manager = OrderManager::new(
        store.clone(),
        store.clone(),
        catalog.clone(),
        Arc::new(FixedOutcomeGateway::approving()),
        NotifyQueue::start(recorder.clone()),
    );
    Fixture {
        manager,
        store,
        catalog,
        recorder,
    }
}

async fn seed_user(store: &MemoryStore, id: &str, points: i64) {
    store
        .upsert(UserAccount {
            id: id.into(),
            name: "Asha Sharma".into(),
            email: format!("{id}@example.com"),
            phone: Some("9000000000".into()),
            is_admin: false,
            points_balance: points,
            wallet_balance: 0,
        })
        .await
        .unwrap();
}

fn item(product_id: &str, name: &str, price: i64, quantity: u32) -> LineItem {
    LineItem {
        product_id: product_id.into(),
        name: name.into(),
        selected_unit: "1kg".into(),
        price,
        quantity,
    }
}

fn checkout(user_id: &str, items: Vec<LineItem>) -> Checkout {
    Checkout {
        user_id: user_id.into(),
        items,
        payment_method: PaymentMethod::Cod,
        address: "12 Lake Road, Kolkata".into(),
        customer_name: "Asha Sharma".into(),
        customer_phone: "9000000000".into(),
        delivery_slot_id: None,
        coupon_code: None,
        points_to_redeem: 0,
        idempotency_key: None,
    }
}

async fn balance(store: &MemoryStore, user_id: &str) -> i64 {
    UserRepository::find_by_id(store, user_id)
        .await
        .unwrap()
        .unwrap()
        .points_balance
}

/// Backdate an order so window checks can be exercised
async fn backdate(store: &MemoryStore, order_id: &str, by_ms: i64) {
    let mut order = OrderRepository::find_by_id(store, order_id)
        .await
        .unwrap()
        .unwrap();
    order.created_at -= by_ms;
    store.save(order).await.unwrap();
}

#[tokio::test]
async fn full_pricing_pipeline_with_coupon_slot_and_points() {
    let f = fixture();
    seed_user(&f.store, "u1", 120).await;

    // subtotal 510, VEGGIE20 -> -102, instant slot -> +49, redeem 50
    let mut c = checkout(
        "u1",
        vec![item("p4", "Alphonso Mango", 450, 1), item("p5", "Banana", 60, 1)],
    );
    c.coupon_code = Some("VEGGIE20".into());
    c.delivery_slot_id = Some("s5".into());
    c.points_to_redeem = 50;

    let receipt = f.manager.create(c).await.unwrap();
    let order = &receipt.order;
    assert_eq!(order.total, 510 - 102 + 49 - 50);
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.points_redeemed, 50);
    // 5% of the charged 407, floored
    assert_eq!(order.points_earned, 20);
    assert_eq!(balance(&f.store, "u1").await, 120 - 50 + 20);
}

#[tokio::test]
async fn cancellation_restores_the_exact_loyalty_balance() {
    let f = fixture();
    seed_user(&f.store, "u1", 120).await;

    let mut c = checkout("u1", vec![item("p2", "Tomato", 40, 10)]);
    c.points_to_redeem = 50;
    let receipt = f.manager.create(c).await.unwrap();
    assert_eq!(balance(&f.store, "u1").await, 120 - 50 + 17); // 5% of 350

    let cancelled = f
        .manager
        .cancel(&receipt.order.id, "u1", false)
        .await
        .unwrap();
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    assert_eq!(balance(&f.store, "u1").await, 120);

    // items and totals survive cancellation untouched
    assert_eq!(cancelled.order.total, receipt.order.total);
    assert_eq!(cancelled.order.items, receipt.order.items);
}

#[tokio::test]
async fn second_cancel_fails_without_double_reversal() {
    let f = fixture();
    seed_user(&f.store, "u1", 100).await;

    let receipt = f
        .manager
        .create(checkout("u1", vec![item("p2", "Tomato", 40, 10)]))
        .await
        .unwrap();
    f.manager.cancel(&receipt.order.id, "u1", false).await.unwrap();
    let before = balance(&f.store, "u1").await;

    let err = f
        .manager
        .cancel(&receipt.order.id, "u1", false)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotCancellable(OrderStatus::Cancelled)));
    assert_eq!(balance(&f.store, "u1").await, before);
}

#[tokio::test]
async fn cancellation_window_edge_is_inclusive() {
    let f = fixture();
    seed_user(&f.store, "u1", 0).await;

    // exactly five minutes old: still cancellable
    let receipt = f
        .manager
        .create(checkout("u1", vec![item("p2", "Tomato", 40, 1)]))
        .await
        .unwrap();
    backdate(&f.store, &receipt.order.id, CANCELLATION_WINDOW_MS).await;
    f.manager.cancel(&receipt.order.id, "u1", false).await.unwrap();

    // past the window: expired, regardless of state
    let receipt = f
        .manager
        .create(checkout("u1", vec![item("p2", "Tomato", 40, 1)]))
        .await
        .unwrap();
    backdate(&f.store, &receipt.order.id, CANCELLATION_WINDOW_MS + 60_000).await;
    assert!(matches!(
        f.manager.cancel(&receipt.order.id, "u1", false).await,
        Err(OrderError::WindowExpired)
    ));
}

#[tokio::test]
async fn admin_may_jump_straight_to_delivered() {
    let f = fixture();
    seed_user(&f.store, "u1", 0).await;

    let receipt = f
        .manager
        .create(checkout("u1", vec![item("p2", "Tomato", 40, 1)]))
        .await
        .unwrap();
    let order = f
        .manager
        .update_status(&receipt.order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn rider_is_locked_while_out_for_delivery() {
    let f = fixture();
    seed_user(&f.store, "u1", 0).await;

    let a = f
        .manager
        .create(checkout("u1", vec![item("p2", "Tomato", 40, 1)]))
        .await
        .unwrap();
    let b = f
        .manager
        .create(checkout("u1", vec![item("p3", "Potato", 35, 1)]))
        .await
        .unwrap();

    let order = f.manager.assign_rider(&a.order.id, "r1").await.unwrap();
    assert_eq!(order.status, OrderStatus::OutForDelivery);
    assert_eq!(order.rider_name.as_deref(), Some("Ramesh Kumar"));

    // the same rider cannot take a second order
    assert!(matches!(
        f.manager.assign_rider(&b.order.id, "r1").await,
        Err(OrderError::Rider(_))
    ));

    // delivery releases the rider for the next order
    f.manager
        .update_status(&a.order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    let rider = f
        .catalog
        .riders()
        .into_iter()
        .find(|r| r.id == "r1")
        .unwrap();
    assert_eq!(rider.status, RiderStatus::Available);
    f.manager.assign_rider(&b.order.id, "r1").await.unwrap();
}

#[tokio::test]
async fn cancelling_an_out_for_delivery_order_is_rejected() {
    let f = fixture();
    seed_user(&f.store, "u1", 0).await;

    let receipt = f
        .manager
        .create(checkout("u1", vec![item("p2", "Tomato", 40, 1)]))
        .await
        .unwrap();
    f.manager.assign_rider(&receipt.order.id, "r4").await.unwrap();

    assert!(matches!(
        f.manager.cancel(&receipt.order.id, "u1", false).await,
        Err(OrderError::NotCancellable(OrderStatus::OutForDelivery))
    ));
}

#[tokio::test]
async fn repeated_idempotency_key_replays_the_original_order() {
    let f = fixture();
    seed_user(&f.store, "u1", 0).await;

    let mut c = checkout("u1", vec![item("p2", "Tomato", 40, 2)]);
    c.idempotency_key = Some("attempt-1".into());

    let first = f.manager.create(c.clone()).await.unwrap();
    assert!(!first.replayed);

    let second = f.manager.create(c).await.unwrap();
    assert!(second.replayed);
    assert_eq!(second.order.id, first.order.id);
    assert_eq!(f.store.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn guest_checkout_earns_no_points() {
    let f = fixture();

    let receipt = f
        .manager
        .create(checkout(GUEST_USER_ID, vec![item("p2", "Tomato", 40, 10)]))
        .await
        .unwrap();
    assert_eq!(receipt.order.points_earned, 0);
    assert_eq!(receipt.order.total, 400);
}

#[tokio::test]
async fn checkout_sends_the_placed_pair_and_each_transition_one_update() {
    let f = fixture();
    seed_user(&f.store, "u1", 0).await;

    let receipt = f
        .manager
        .create(checkout("u1", vec![item("p2", "Tomato", 40, 2)]))
        .await
        .unwrap();

    // placed pair: company desk first, then the customer
    let sent = f.recorder.wait_for(2).await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|n| n.kind == TemplateKind::OrderPlaced));
    assert_eq!(sent[0].audience, Audience::Company);
    assert_eq!(sent[1].audience, Audience::Customer);
    assert!(sent[1].text.contains(&receipt.order.id));

    f.manager
        .update_status(&receipt.order.id, OrderStatus::Packed)
        .await
        .unwrap();
    let sent = f.recorder.wait_for(3).await;
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[2].kind, TemplateKind::StatusChanged);
    assert!(sent[2].text.contains("Packed"));

    // a same-status update is a no-op and sends nothing
    f.manager
        .update_status(&receipt.order.id, OrderStatus::Packed)
        .await
        .unwrap();
    f.manager
        .update_status(&receipt.order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    let sent = f.recorder.wait_for(4).await;
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[3].kind, TemplateKind::StatusChanged);
    assert!(sent[3].text.contains("Delivered"));
}

#[tokio::test]
async fn cancellation_sends_the_company_and_customer_pair() {
    let f = fixture();
    seed_user(&f.store, "u1", 0).await;

    let receipt = f
        .manager
        .create(checkout("u1", vec![item("p2", "Tomato", 40, 2)]))
        .await
        .unwrap();
    f.recorder.wait_for(2).await;

    f.manager.cancel(&receipt.order.id, "u1", false).await.unwrap();
    let sent = f.recorder.wait_for(4).await;
    assert_eq!(sent.len(), 4);
    let pair = &sent[2..];
    assert!(pair.iter().all(|n| n.kind == TemplateKind::Cancelled));
    assert_eq!(pair[0].audience, Audience::Company);
    assert_eq!(pair[1].audience, Audience::Customer);
    assert!(pair[0].text.contains("CANCELLED"));
}

#[tokio::test]
async fn other_users_cannot_see_or_cancel_an_order() {
    let f = fixture();
    seed_user(&f.store, "u1", 0).await;
    seed_user(&f.store, "u2", 0).await;

    let receipt = f
        .manager
        .create(checkout("u1", vec![item("p2", "Tomato", 40, 1)]))
        .await
        .unwrap();

    assert!(matches!(
        f.manager.get(&receipt.order.id, "u2", false).await,
        Err(OrderError::NotOwner)
    ));
    assert!(matches!(
        f.manager.cancel(&receipt.order.id, "u2", false).await,
        Err(OrderError::NotOwner)
    ));

    // admins can
    f.manager.get(&receipt.order.id, "admin", true).await.unwrap();
}
