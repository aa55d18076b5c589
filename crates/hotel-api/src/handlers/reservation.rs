//! Reservation handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use hotel_core::types::{PageResponse, ReservationId};
use hotel_service::ReservationView;

use crate::dto::request::CreateReservationRequest;
use crate::dto::response::{ApiResponse, ReservationCreated};
use crate::error::ApiError;
use crate::extractors::{Guest, PaginationParams};
use crate::state::AppState;

/// POST /api/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    guest: Guest,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReservationCreated>>), ApiError> {
    let stored = state
        .allocator
        .allocate(&guest, req.into_allocation()?)
        .await?;
    let replayed = stored.is_replay();
    let reservation = ReservationView::at(stored.into_inner(), &guest, &state.config.booking);

    let status = if replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(ApiResponse::ok(ReservationCreated {
            reservation_id: reservation.reservation.id,
            total: reservation.reservation.total,
            replayed,
            reservation,
        })),
    ))
}

/// GET /api/reservations
pub async fn list_reservations(
    State(state): State<AppState>,
    guest: Guest,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<ReservationView>>>, ApiError> {
    let page = state
        .allocator
        .list_reservations(&guest, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    guest: Guest,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReservationView>>, ApiError> {
    let view = state
        .allocator
        .get_reservation(&guest, ReservationId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/reservations/{id}/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    guest: Guest,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReservationView>>, ApiError> {
    let view = state
        .lifecycle
        .cancel_reservation(&guest, ReservationId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}
