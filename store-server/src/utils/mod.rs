//! Utilities: unified error handling and logging

pub mod error;
pub mod logger;

pub use error::{AppError, AppResponse, AppResult, ok, ok_with_message};
