//! Custom Axum extractors.

pub mod auth;
pub mod pagination;

pub use auth::{Caller, Guest};
pub use pagination::PaginationParams;
