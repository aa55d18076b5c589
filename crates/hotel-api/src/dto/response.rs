//! Response DTOs.

use serde::{Deserialize, Serialize};

use hotel_core::types::{Money, OrderId, ReservationId};
use hotel_entity::order::{OrderWithLines, RejectedLine};
use hotel_service::{CheckoutResult, ReservationView};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Result of `POST /api/reservations`.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationCreated {
    /// New (or replayed) reservation.
    pub reservation_id: ReservationId,
    /// Amount owed.
    pub total: Money,
    /// Whether an earlier request with the same key produced it.
    pub replayed: bool,
    /// Full record.
    pub reservation: ReservationView,
}

/// Result of `POST /api/checkout`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    /// Persisted order.
    pub order_id: OrderId,
    /// Recomputed total.
    pub total: Money,
    /// Lines billed.
    pub line_count: usize,
    /// Lines left out, with reasons.
    pub rejected_lines: Vec<RejectedLine>,
    /// Whether an earlier request with the same key produced it.
    pub replayed: bool,
    /// Full order.
    pub order: OrderWithLines,
}

impl From<CheckoutResult> for CheckoutResponse {
    fn from(result: CheckoutResult) -> Self {
        Self {
            order_id: result.order.order.id,
            total: result.order.order.total,
            line_count: result.order.lines.len(),
            rejected_lines: result.rejected_lines,
            replayed: result.replayed,
            order: result.order,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// `connected`, `unreachable` or `memory`.
    pub database: String,
}
