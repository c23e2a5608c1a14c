//! Shared types for the GreenBasket storefront
//!
//! Common types used across crates: domain models, error codes and
//! small utilities (timestamps, order IDs).

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::ApiErrorCode;
pub use serde::{Deserialize, Serialize};
