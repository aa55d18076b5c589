//! Caller extractors: pull the bearer token from the Authorization header,
//! validate it, and build the engine's `RequestContext`.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use hotel_auth::Requester;
use hotel_core::error::AppError;
use hotel_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Any caller. No header means anonymous; a header that does not carry a
/// valid token is rejected with 401 rather than downgraded.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub RequestContext);

/// A signed-in guest. Anonymous callers are rejected with 401.
#[derive(Debug, Clone, Copy)]
pub struct Guest(pub RequestContext);

impl std::ops::Deref for Caller {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::Deref for Guest {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Caller(RequestContext::new(Requester::Anonymous)));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::unauthenticated(AppError::authorization(
                    "Invalid Authorization header format",
                ))
            })?;

        let claims = state
            .jwt_decoder
            .decode(token)
            .map_err(ApiError::unauthenticated)?;

        Ok(Caller(RequestContext::new(Requester::Authenticated(
            claims.user_id(),
        ))))
    }
}

impl FromRequestParts<AppState> for Guest {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Caller(ctx) = Caller::from_request_parts(parts, state).await?;
        ctx.requester_id().map_err(ApiError::unauthenticated)?;
        Ok(Guest(ctx))
    }
}
