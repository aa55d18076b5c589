//! Mapping of sqlx failures onto [`AppError`].

use hotel_core::error::{AppError, ErrorKind};
use hotel_core::types::ReservationId;

/// PostgreSQL `exclusion_violation`.
const EXCLUSION_VIOLATION: &str = "23P01";
/// PostgreSQL `query_canceled`, raised when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";
/// PostgreSQL `lock_not_available`, raised when `lock_timeout` fires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// Translate a sqlx error.
///
/// An exclusion violation means an overlapping reservation committed
/// first and becomes a conflict. Timeouts stay persistence errors with a
/// message saying so; nothing here retries.
pub fn map_sqlx(context: &str, err: sqlx::Error) -> AppError {
    if matches!(err, sqlx::Error::PoolTimedOut) {
        return AppError::with_source(
            ErrorKind::Persistence,
            format!("{context}: timed out waiting for a database connection"),
            err,
        );
    }

    match database_code(&err).as_deref() {
        Some(EXCLUSION_VIOLATION) => AppError::with_source(
            ErrorKind::Conflict,
            "The resource is already reserved for an overlapping window",
            err,
        ),
        Some(QUERY_CANCELED) | Some(LOCK_NOT_AVAILABLE) => AppError::with_source(
            ErrorKind::Persistence,
            format!("{context}: timed out waiting for the database"),
            err,
        ),
        _ => AppError::with_source(ErrorKind::Persistence, context.to_string(), err),
    }
}

fn database_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

/// Closure form of [`map_sqlx`] for `map_err`.
pub fn db_err(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| map_sqlx(context, e)
}

/// Refusal to cancel a reservation that an open order still bills.
pub(crate) fn billed_reservation(id: ReservationId) -> AppError {
    AppError::conflict(format!(
        "Reservation {id} is billed by an open order; cancel the order first"
    ))
    .with_details(serde_json::json!({ "reservation_id": id }))
}
