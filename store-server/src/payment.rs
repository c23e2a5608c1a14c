//! Payment gateway seam
//!
//! The checkout core charges through [`PaymentGateway`] and never knows
//! which adapter is behind it. [`SimulatedGateway`] is the demo adapter:
//! a fixed "processing" delay followed by a single random draw at 90%
//! success. The draw happens exactly once per charge; a declined attempt
//! is never re-evaluated.

use std::time::Duration;

use async_trait::async_trait;
use shared::util::payment_reference;

/// Result of one charge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Approved { reference: String },
    Declined { reason: String },
}

/// Gateway seam; adapters must resolve every charge (no cancellation of
/// an in-flight attempt).
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, amount: i64) -> PaymentOutcome;
}

/// Demo gateway: bounded latency, one 90% draw per attempt
pub struct SimulatedGateway {
    delay: Duration,
    success_rate: f64,
}

impl SimulatedGateway {
    pub fn new(delay: Duration, success_rate: f64) -> Self {
        Self {
            delay,
            success_rate,
        }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500), 0.9)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, amount: i64) -> PaymentOutcome {
        tokio::time::sleep(self.delay).await;

        let draw: f64 = {
            use rand::Rng;
            rand::thread_rng().gen_range(0.0..1.0)
        };
        if draw < self.success_rate {
            let reference = payment_reference();
            tracing::info!(amount, reference = %reference, "Simulated payment approved");
            PaymentOutcome::Approved { reference }
        } else {
            tracing::warn!(amount, "Simulated payment declined");
            PaymentOutcome::Declined {
                reason: "Payment declined by gateway".into(),
            }
        }
    }
}

/// Deterministic gateway for tests: the caller supplies the outcome
pub struct FixedOutcomeGateway {
    approve: bool,
}

impl FixedOutcomeGateway {
    pub fn approving() -> Self {
        Self { approve: true }
    }

    pub fn declining() -> Self {
        Self { approve: false }
    }
}

#[async_trait]
impl PaymentGateway for FixedOutcomeGateway {
    async fn charge(&self, _amount: i64) -> PaymentOutcome {
        if self.approve {
            PaymentOutcome::Approved {
                reference: payment_reference(),
            }
        } else {
            PaymentOutcome::Declined {
                reason: "Declined (test)".into(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_gateway_always_approves_at_rate_one() {
        let gw = SimulatedGateway::new(Duration::ZERO, 1.0);
        for _ in 0..10 {
            assert!(matches!(
                gw.charge(100).await,
                PaymentOutcome::Approved { .. }
            ));
        }
    }

    #[tokio::test]
    async fn simulated_gateway_always_declines_at_rate_zero() {
        let gw = SimulatedGateway::new(Duration::ZERO, 0.0);
        assert!(matches!(
            gw.charge(100).await,
            PaymentOutcome::Declined { .. }
        ));
    }
}
