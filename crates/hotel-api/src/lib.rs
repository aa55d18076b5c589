//! # hotel-api
//!
//! HTTP API layer for the Flor de Lima booking engine built on Axum.
//!
//! Provides the REST endpoints, middleware (logging, CORS, timeouts),
//! caller extractors, DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
