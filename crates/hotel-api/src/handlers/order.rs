//! Checkout and order handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use hotel_core::types::{OrderId, PageResponse};
use hotel_entity::order::{Order, OrderWithLines};

use crate::dto::request::CheckoutBody;
use crate::dto::response::{ApiResponse, CheckoutResponse};
use crate::error::ApiError;
use crate::extractors::{Guest, PaginationParams};
use crate::state::AppState;

/// POST /api/checkout
pub async fn checkout(
    State(state): State<AppState>,
    guest: Guest,
    Json(body): Json<CheckoutBody>,
) -> Result<(StatusCode, Json<ApiResponse<CheckoutResponse>>), ApiError> {
    let result = state.checkout.checkout(&guest, body.into_checkout()?).await?;
    let status = if result.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(ApiResponse::ok(result.into()))))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    guest: Guest,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Order>>>, ApiError> {
    let page = state
        .checkout
        .list_orders(&guest, params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    guest: Guest,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderWithLines>>, ApiError> {
    let order = state
        .checkout
        .get_order(&guest, OrderId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// POST /api/orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    guest: Guest,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let order = state
        .lifecycle
        .cancel_order(&guest, OrderId::from_uuid(id))
        .await?;
    Ok(Json(ApiResponse::ok(order)))
}
