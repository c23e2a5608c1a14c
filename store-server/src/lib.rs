//! GreenBasket Store Server - grocery storefront backend
//!
//! # Architecture
//!
//! The server owns the checkout core of the storefront: cart pricing,
//! coupons, loyalty points, the order lifecycle state machine and rider
//! dispatch. Catalog data, identity, payments and outbound messaging sit
//! behind seams so demo adapters can be swapped for real ones.
//!
//! # Module structure
//!
//! ```text
//! store-server/src/
//! ├── core/        # Config, server state, HTTP server
//! ├── auth/        # Actor extraction (identity collaborator seam)
//! ├── api/         # HTTP routes and handlers
//! ├── catalog.rs   # Reference data: products, coupons, slots, riders
//! ├── pricing/     # Cart, coupon engine, totals
//! ├── marketing/   # Loyalty point arithmetic
//! ├── orders/      # Order lifecycle manager
//! ├── payment.rs   # Payment gateway seam + simulated adapter
//! ├── notify/      # Outbound notification queue
//! ├── invoice.rs   # Invoice document builder
//! ├── db/          # Repository traits, in-memory and redb stores
//! └── utils/       # AppError, logging
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod invoice;
pub mod marketing;
pub mod notify;
pub mod orders;
pub mod payment;
pub mod pricing;
pub mod utils;

// Re-export public types
pub use auth::Actor;
pub use catalog::CatalogService;
pub use crate::core::{Config, Server, ServerState};
pub use orders::OrderManager;
pub use pricing::CartService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   ______                     ____             __        __
  / ____/_______  ___  ____  / __ )____ ______/ /_____  / /_
 / / __/ ___/ _ \/ _ \/ __ \/ __  / __ `/ ___/ //_/ _ \/ __/
/ /_/ / /  /  __/  __/ / / / /_/ / /_/ (__  ) ,< /  __/ /_
\____/_/   \___/\___/_/ /_/_____/\__,_/____/_/|_|\___/\__/
"#
    );
}
