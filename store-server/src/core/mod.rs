//! Core Module
//!
//! - [`config`]: environment-driven configuration
//! - [`state`]: shared service handles ([`ServerState`])
//! - [`server`]: HTTP server bootstrap

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;
