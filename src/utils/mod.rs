//! Shared utilities: error types and output file naming.

pub mod error;
pub mod naming;

pub use error::{AppError, AppResult, ErrorResponse};
