//! Request DTOs with validation.
//!
//! Room windows are sent as dates (`YYYY-MM-DD`, check-in and check-out);
//! leisure windows as hotel-local date-times (`YYYY-MM-DDTHH:MM`).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use hotel_core::error::AppError;
use hotel_core::types::{BookingWindow, ResourceClassId};
use hotel_entity::catalog::ResourceKind;
use hotel_entity::order::CartLine;
use hotel_service::{AllocationRequest, AvailabilityQuery, CheckoutRequest};

/// `GET /api/availability` query string.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AvailabilityParams {
    /// `room` or `leisure_area`.
    pub kind: Option<String>,
    /// Restrict to one class.
    pub class_id: Option<Uuid>,
    /// Check-in date or slot start.
    pub start: String,
    /// Check-out date or slot end.
    pub end: String,
    /// Number of guests.
    #[serde(default = "default_party_size")]
    #[validate(range(min = 1, max = 100, message = "Party size must be between 1 and 100"))]
    pub party_size: u32,
}

impl AvailabilityParams {
    /// Convert into an engine query.
    pub fn into_query(self) -> Result<AvailabilityQuery, AppError> {
        validate_request(&self)?;
        Ok(AvailabilityQuery {
            kind: parse_kind(self.kind.as_deref())?,
            class_id: self.class_id.map(ResourceClassId::from_uuid),
            window: parse_window(&self.start, &self.end)?,
            party_size: self.party_size,
        })
    }
}

/// `POST /api/reservations` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReservationRequest {
    /// Class to book.
    pub class_id: Option<Uuid>,
    /// Kind to book when no class is given.
    pub kind: Option<String>,
    /// Check-in date or slot start.
    pub start: String,
    /// Check-out date or slot end.
    pub end: String,
    /// Number of guests.
    #[validate(range(min = 1, max = 100, message = "Party size must be between 1 and 100"))]
    pub party_size: u32,
    /// Special requests.
    #[validate(length(max = 1000, message = "Notes are limited to 1000 characters"))]
    pub notes: Option<String>,
    /// Retry token.
    #[validate(length(min = 1, max = 128, message = "Idempotency key must be 1 to 128 characters"))]
    pub idempotency_key: Option<String>,
}

impl CreateReservationRequest {
    /// Convert into an allocation request.
    pub fn into_allocation(self) -> Result<AllocationRequest, AppError> {
        validate_request(&self)?;
        Ok(AllocationRequest {
            class_id: self.class_id.map(ResourceClassId::from_uuid),
            kind: parse_kind(self.kind.as_deref())?,
            window: parse_window(&self.start, &self.end)?,
            party_size: self.party_size,
            notes: self.notes,
            idempotency_key: self.idempotency_key,
        })
    }
}

/// `POST /api/checkout` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutBody {
    /// Cart lines.
    #[serde(default)]
    pub lines: Vec<CartLine>,
    /// Bar table.
    #[validate(length(max = 16, message = "Table number is limited to 16 characters"))]
    pub table_number: Option<String>,
    /// Notes for the bar.
    #[validate(length(max = 1000, message = "Notes are limited to 1000 characters"))]
    pub notes: Option<String>,
    /// Retry token.
    #[validate(length(min = 1, max = 128, message = "Idempotency key must be 1 to 128 characters"))]
    pub idempotency_key: Option<String>,
}

impl CheckoutBody {
    /// Convert into a checkout request.
    pub fn into_checkout(self) -> Result<CheckoutRequest, AppError> {
        validate_request(&self)?;
        Ok(CheckoutRequest {
            lines: self.lines,
            table_number: self.table_number,
            notes: self.notes,
            idempotency_key: self.idempotency_key,
        })
    }
}

fn default_party_size() -> u32 {
    1
}

/// Run `validator` rules, reporting the first failing field.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate().map_err(|errors| {
        let mut failures: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"));
                (field.to_string(), message)
            })
            .collect();
        failures.sort();
        match failures.into_iter().next() {
            Some((field, message)) => AppError::validation(message).with_field(field),
            None => AppError::validation("Invalid request"),
        }
    })
}

fn parse_kind(kind: Option<&str>) -> Result<Option<ResourceKind>, AppError> {
    kind.map(str::parse).transpose()
}

/// Parse a window from two dates or two local date-times.
pub fn parse_window(start: &str, end: &str) -> Result<BookingWindow, AppError> {
    let date = |s: &str| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok();
    if let (Some(check_in), Some(check_out)) = (date(start), date(end)) {
        return BookingWindow::nights(check_in, check_out);
    }
    BookingWindow::new(parse_datetime(start, "start")?, parse_datetime(end, "end")?)
}

fn parse_datetime(value: &str, field: &str) -> Result<NaiveDateTime, AppError> {
    let value = value.trim();
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .ok_or_else(|| {
            AppError::validation(format!(
                "Invalid {field}: '{value}'. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM"
            ))
            .with_field(field)
        })
}
