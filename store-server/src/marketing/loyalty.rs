//! Loyalty Ledger
//!
//! Pure functions over a single integer balance. 1 point = ₹1, earned at
//! 5% of the charged total (floored). The balance is clamped at zero on
//! every settlement; a negative balance never persists.
//!
//! Order creation settles `- redeemed + earned` in one step; cancellation
//! reverses exactly the amounts recorded on the order, never a recompute.

/// Earn rate: 5% of the charged total
pub const EARN_RATE_PERCENT: i64 = 5;

/// Points earned by an order, floored to a whole point
pub fn points_earned(charged_total: i64) -> i64 {
    charged_total * EARN_RATE_PERCENT / 100
}

/// New balance after checkout: redeemed points leave, earned points arrive
pub fn settle_checkout(balance: i64, redeemed: i64, earned: i64) -> i64 {
    (balance - redeemed + earned).max(0)
}

/// New balance after cancellation: the exact inverse of `settle_checkout`
pub fn reverse_cancellation(balance: i64, redeemed: i64, earned: i64) -> i64 {
    (balance + redeemed - earned).max(0)
}
