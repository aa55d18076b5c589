//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use hotel_auth::JwtDecoder;
use hotel_core::config::AppConfig;
use hotel_database::DatabasePool;
use hotel_database::store::{CatalogGateway, OrderStore, ReservationStore};
use hotel_service::{AvailabilityIndex, LifecycleService, OrderAggregator, ReservationAllocator};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool, absent when running on the memory store
    pub db_pool: Option<DatabasePool>,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Availability search
    pub availability: Arc<AvailabilityIndex>,
    /// Reservation allocation and history
    pub allocator: Arc<ReservationAllocator>,
    /// Checkout and order history
    pub checkout: Arc<OrderAggregator>,
    /// Cancellation
    pub lifecycle: Arc<LifecycleService>,
}

impl AppState {
    /// Wire the engine services over the given stores.
    pub fn new(
        config: AppConfig,
        db_pool: Option<DatabasePool>,
        catalog: Arc<dyn CatalogGateway>,
        reservations: Arc<dyn ReservationStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        let booking = config.booking.clone();
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

        let availability = Arc::new(AvailabilityIndex::new(
            Arc::clone(&catalog),
            Arc::clone(&reservations),
            booking.clone(),
        ));
        let allocator = Arc::new(ReservationAllocator::new(
            Arc::clone(&catalog),
            Arc::clone(&reservations),
            Arc::clone(&availability),
            booking.clone(),
        ));
        let checkout = Arc::new(OrderAggregator::new(
            Arc::clone(&catalog),
            Arc::clone(&reservations),
            Arc::clone(&orders),
            booking.clone(),
        ));
        let lifecycle = Arc::new(LifecycleService::new(
            Arc::clone(&reservations),
            Arc::clone(&orders),
            booking,
        ));

        Self {
            config: Arc::new(config),
            db_pool,
            jwt_decoder,
            availability,
            allocator,
            checkout,
            lifecycle,
        }
    }
}
