//! Reservation entity model.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use hotel_core::types::{
    BookingWindow, Money, ReservationId, ResourceClassId, ResourceId, UserId,
};

use crate::catalog::ResourceKind;
use crate::lifecycle::LifecycleStatus;

/// A claim on a resource for a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: ReservationId,
    /// The claimed resource.
    pub resource_id: ResourceId,
    /// Class of the claimed resource at booking time.
    pub class_id: ResourceClassId,
    /// Room or leisure area.
    pub resource_kind: ResourceKind,
    /// Owner.
    pub requester_id: UserId,
    /// Claimed interval, hotel-local.
    pub window: BookingWindow,
    /// Number of guests.
    pub party_size: u32,
    /// Priced total at creation.
    pub total: Money,
    /// Stored lifecycle status.
    pub status: LifecycleStatus,
    /// Special requests.
    pub notes: Option<String>,
    /// Caller-supplied retry token.
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
    /// When the reservation was created.
    pub created_at: DateTime<Utc>,
    /// When the reservation was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Status as seen at `now` (hotel-local).
    pub fn effective_status(&self, now: NaiveDateTime) -> LifecycleStatus {
        self.status.effective(Some(self.window.start()), now)
    }

    /// Check if the reservation belongs to the given requester.
    pub fn is_owned_by(&self, requester: UserId) -> bool {
        self.requester_id == requester
    }

    /// Check if this reservation still blocks the resource.
    pub fn holds_resource(&self) -> bool {
        self.status.holds_resource()
    }
}

impl<'r> FromRow<'r, PgRow> for Reservation {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let start: NaiveDateTime = row.try_get("window_start")?;
        let end: NaiveDateTime = row.try_get("window_end")?;
        let window = BookingWindow::new(start, end).map_err(|e| sqlx::Error::ColumnDecode {
            index: "window_start".to_string(),
            source: Box::new(e),
        })?;
        let party_size: i32 = row.try_get("party_size")?;
        let party_size = u32::try_from(party_size).map_err(|e| sqlx::Error::ColumnDecode {
            index: "party_size".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            resource_id: row.try_get("resource_id")?,
            class_id: row.try_get("class_id")?,
            resource_kind: row.try_get("resource_kind")?,
            requester_id: row.try_get("requester_id")?,
            window,
            party_size,
            total: row.try_get("total")?,
            status: row.try_get("status")?,
            notes: row.try_get("notes")?,
            idempotency_key: row.try_get("idempotency_key")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Data required to insert a reservation. Always starts as `pending`.
#[derive(Debug, Clone)]
pub struct NewReservation {
    /// The chosen resource.
    pub resource_id: ResourceId,
    /// Its class.
    pub class_id: ResourceClassId,
    /// Room or leisure area.
    pub resource_kind: ResourceKind,
    /// Owner.
    pub requester_id: UserId,
    /// Claimed interval.
    pub window: BookingWindow,
    /// Number of guests.
    pub party_size: u32,
    /// Priced total.
    pub total: Money,
    /// Special requests.
    pub notes: Option<String>,
    /// Caller-supplied retry token.
    pub idempotency_key: Option<String>,
}

impl NewReservation {
    /// Materialize the record as it will be stored.
    pub fn into_reservation(self, now: DateTime<Utc>) -> Reservation {
        Reservation {
            id: ReservationId::new(),
            resource_id: self.resource_id,
            class_id: self.class_id,
            resource_kind: self.resource_kind,
            requester_id: self.requester_id,
            window: self.window,
            party_size: self.party_size,
            total: self.total,
            status: LifecycleStatus::Pending,
            notes: self.notes,
            idempotency_key: self.idempotency_key,
            created_at: now,
            updated_at: now,
        }
    }
}
