//! Availability search handler.

use axum::Json;
use axum::extract::{Query, State};

use hotel_service::AvailableResource;

use crate::dto::request::AvailabilityParams;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::Caller;
use crate::state::AppState;

/// GET /api/availability
pub async fn search(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<ApiResponse<Vec<AvailableResource>>>, ApiError> {
    let query = params.into_query()?;
    let free = state.availability.find_available(&caller, &query).await?;
    Ok(Json(ApiResponse::ok(free)))
}
