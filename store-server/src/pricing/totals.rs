//! Cart totals
//!
//! All amounts are whole rupees. The grand total is clamped at zero before
//! the slot surcharge is added, so it can never go negative even when a
//! discount exceeds the subtotal.

use serde::Serialize;

/// Computed cart totals
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: i64,
    pub discount: i64,
    pub slot_surcharge: i64,
    pub grand_total: i64,
}

impl CartTotals {
    pub fn compute(subtotal: i64, discount: i64, slot_surcharge: i64) -> Self {
        Self {
            subtotal,
            discount,
            slot_surcharge,
            grand_total: (subtotal - discount).max(0) + slot_surcharge,
        }
    }

    pub fn empty() -> Self {
        Self::compute(0, 0, 0)
    }
}
