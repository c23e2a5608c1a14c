//! Coupon Engine
//!
//! Validates a coupon code against the current subtotal and computes the
//! discount. Callers re-run `apply` whenever the subtotal changes; a
//! coupon accepted earlier can become invalid as the cart shrinks.

use std::sync::Arc;

use shared::models::{Coupon, DiscountType};
use thiserror::Error;

use crate::catalog::CatalogService;

/// Coupon application failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    #[error("Invalid coupon code")]
    InvalidCode,

    /// Inactive codes hard-fail at apply time; see DESIGN.md
    #[error("This coupon is no longer active")]
    Inactive,

    #[error("Minimum order value of ₹{min} required")]
    BelowMinimum { min: i64 },
}

/// A successfully applied coupon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
    /// Normalized (upper-case) code
    pub code: String,
    pub discount: i64,
}

/// Coupon engine over the catalog's coupon table
#[derive(Clone)]
pub struct CouponEngine {
    catalog: Arc<CatalogService>,
}

impl CouponEngine {
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self { catalog }
    }

    /// Validate `code` against `subtotal` and compute the discount
    pub fn apply(&self, code: &str, subtotal: i64) -> Result<AppliedCoupon, CouponError> {
        let coupon = self
            .catalog
            .find_coupon(code)
            .ok_or(CouponError::InvalidCode)?;

        if !coupon.is_active {
            return Err(CouponError::Inactive);
        }
        if subtotal < coupon.min_order {
            return Err(CouponError::BelowMinimum {
                min: coupon.min_order,
            });
        }

        Ok(AppliedCoupon {
            code: coupon.code.clone(),
            discount: discount_amount(coupon, subtotal),
        })
    }
}

/// Discount for a coupon at a given subtotal.
///
/// Percent discounts round half-up to the nearest whole rupee.
pub fn discount_amount(coupon: &Coupon, subtotal: i64) -> i64 {
    match coupon.discount {
        DiscountType::Flat(value) => value,
        DiscountType::Percent(pct) => (subtotal * i64::from(pct) + 50) / 100,
    }
}
