//! Per-session carts
//!
//! A cart is an ordered list of line items, unique by
//! `(product_id, selected_unit)`, plus an optionally attached coupon.
//!
//! Invariant: the coupon is revalidated against the new subtotal after
//! every mutation. A coupon whose minimum the cart no longer meets is
//! silently detached; this is a continuous check, not a one-time
//! validation at apply time.

use dashmap::DashMap;
use serde::Serialize;
use shared::models::{DeliverySlot, LineItem};
use thiserror::Error;

use super::coupon::{CouponEngine, CouponError};
use super::totals::CartTotals;

/// Cart mutation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Item price must be positive")]
    InvalidPrice,

    #[error("Item not in cart: {0}")]
    ItemNotFound(String),
}

/// One session's cart
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<LineItem>,
    coupon_code: Option<String>,
}

impl Cart {
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    pub fn subtotal(&self) -> i64 {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Add an item; an existing `(product_id, selected_unit)` line has its
    /// quantity increased instead of a second line appearing.
    fn add_item(&mut self, item: LineItem) -> Result<(), CartError> {
        if item.quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }
        if item.price <= 0 {
            return Err(CartError::InvalidPrice);
        }

        if let Some(existing) = self.items.iter_mut().find(|i| {
            i.product_id == item.product_id && i.selected_unit == item.selected_unit
        }) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        Ok(())
    }

    fn update_quantity(
        &mut self,
        product_id: &str,
        selected_unit: &str,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id && i.selected_unit == selected_unit)
            .ok_or_else(|| CartError::ItemNotFound(product_id.to_string()))?;
        item.quantity = quantity;
        Ok(())
    }

    fn remove_item(&mut self, product_id: &str, selected_unit: &str) -> bool {
        let before = self.items.len();
        self.items
            .retain(|i| !(i.product_id == product_id && i.selected_unit == selected_unit));
        self.items.len() != before
    }

    fn clear(&mut self) {
        self.items.clear();
        self.coupon_code = None;
    }

    /// Re-run the coupon against the current subtotal; detach silently on
    /// any failure. Called after every mutation.
    fn revalidate_coupon(&mut self, engine: &CouponEngine) {
        if let Some(code) = &self.coupon_code
            && engine.apply(code, self.subtotal()).is_err()
        {
            self.coupon_code = None;
        }
    }

    /// Current discount; 0 when no coupon is attached
    fn discount(&self, engine: &CouponEngine) -> i64 {
        self.coupon_code
            .as_deref()
            .and_then(|code| engine.apply(code, self.subtotal()).ok())
            .map(|applied| applied.discount)
            .unwrap_or(0)
    }
}

/// Serializable view of a cart for API responses
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub totals: CartTotals,
}

/// Cart service - carts keyed by session id
///
/// Sessions are independent; the same account in two tabs sees last writer
/// wins, matching the storefront's storage model.
pub struct CartService {
    carts: DashMap<String, Cart>,
    coupons: CouponEngine,
}

impl CartService {
    pub fn new(coupons: CouponEngine) -> Self {
        Self {
            carts: DashMap::new(),
            coupons,
        }
    }

    pub fn add_item(&self, session: &str, item: LineItem) -> Result<(), CartError> {
        let mut cart = self.carts.entry(session.to_string()).or_default();
        cart.add_item(item)?;
        cart.revalidate_coupon(&self.coupons);
        Ok(())
    }

    pub fn update_quantity(
        &self,
        session: &str,
        product_id: &str,
        selected_unit: &str,
        quantity: u32,
    ) -> Result<(), CartError> {
        let mut cart = self.carts.entry(session.to_string()).or_default();
        cart.update_quantity(product_id, selected_unit, quantity)?;
        cart.revalidate_coupon(&self.coupons);
        Ok(())
    }

    pub fn remove_item(&self, session: &str, product_id: &str, selected_unit: &str) -> bool {
        let Some(mut cart) = self.carts.get_mut(session) else {
            return false;
        };
        let removed = cart.remove_item(product_id, selected_unit);
        cart.revalidate_coupon(&self.coupons);
        removed
    }

    pub fn clear(&self, session: &str) {
        if let Some(mut cart) = self.carts.get_mut(session) {
            cart.clear();
        }
    }

    /// Attach a coupon. Unlike the continuous revalidation, failures here
    /// are reported to the caller.
    pub fn apply_coupon(&self, session: &str, code: &str) -> Result<i64, CouponError> {
        let mut cart = self.carts.entry(session.to_string()).or_default();
        let applied = self.coupons.apply(code, cart.subtotal())?;
        cart.coupon_code = Some(applied.code);
        Ok(applied.discount)
    }

    pub fn remove_coupon(&self, session: &str) {
        if let Some(mut cart) = self.carts.get_mut(session) {
            cart.coupon_code = None;
        }
    }

    /// Cart contents with totals for the given delivery slot
    pub fn view(&self, session: &str, slot: Option<&DeliverySlot>) -> CartView {
        let surcharge = slot.map(|s| s.surcharge).unwrap_or(0);
        match self.carts.get(session) {
            Some(cart) => {
                let subtotal = cart.subtotal();
                let discount = cart.discount(&self.coupons);
                CartView {
                    items: cart.items.clone(),
                    coupon_code: cart.coupon_code.clone(),
                    totals: CartTotals::compute(subtotal, discount, surcharge),
                }
            }
            None => CartView {
                items: Vec::new(),
                coupon_code: None,
                totals: CartTotals::compute(0, 0, surcharge),
            },
        }
    }

    /// Snapshot the cart for checkout. The cart itself is cleared only
    /// after the order is created (`clear`).
    pub fn checkout_snapshot(&self, session: &str, slot: Option<&DeliverySlot>) -> CartView {
        self.view(session, slot)
    }
}
