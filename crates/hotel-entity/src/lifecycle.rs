//! Lifecycle status shared by reservations and orders.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use hotel_core::error::AppError;

/// Status of a reservation or an order.
///
/// `Completed` is never written by the engine: a confirmed record whose
/// window has started is reported as completed when read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lifecycle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    /// Created, awaiting confirmation.
    Pending,
    /// Confirmed by staff.
    Confirmed,
    /// Cancelled by the requester.
    Cancelled,
    /// Confirmed and already started.
    Completed,
}

impl LifecycleStatus {
    /// Statuses that hold a claim on the resource.
    pub const ACTIVE: [LifecycleStatus; 2] = [Self::Pending, Self::Confirmed];

    /// Whether a record in this status blocks overlapping reservations.
    pub fn holds_resource(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }

    /// Whether a stored transition `self -> next` is allowed.
    pub fn can_transition(&self, next: LifecycleStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed) | (Self::Pending, Self::Cancelled)
        )
    }

    /// The status as seen by a reader at `now`, given when the claim starts.
    pub fn effective(&self, starts_at: Option<NaiveDateTime>, now: NaiveDateTime) -> Self {
        match (self, starts_at) {
            (Self::Confirmed, Some(start)) if start <= now => Self::Completed,
            _ => *self,
        }
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LifecycleStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::validation(format!(
                "Invalid status: '{s}'. Expected one of: pending, confirmed, cancelled, completed"
            ))),
        }
    }
}
