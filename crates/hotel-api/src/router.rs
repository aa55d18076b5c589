//! Route definitions for the booking HTTP API.
//!
//! All routes are mounted under `/api`. Staff confirmation is not routed;
//! it belongs to the back office.

use std::time::Duration;

use axum::http::StatusCode;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(availability_routes())
        .merge(reservation_routes())
        .merge(order_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Availability search
fn availability_routes() -> Router<AppState> {
    Router::new().route("/availability", get(handlers::availability::search))
}

/// Reservation create, history, cancel
fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            post(handlers::reservation::create_reservation)
                .get(handlers::reservation::list_reservations),
        )
        .route("/reservations/{id}", get(handlers::reservation::get_reservation))
        .route(
            "/reservations/{id}/cancel",
            post(handlers::reservation::cancel_reservation),
        )
}

/// Checkout and order history
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(handlers::order::checkout))
        .route("/orders", get(handlers::order::list_orders))
        .route("/orders/{id}", get(handlers::order::get_order))
        .route("/orders/{id}/cancel", post(handlers::order::cancel_order))
}

/// Health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
