//! Concrete bookable resource: a room or a leisure area instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hotel_core::types::{ResourceClassId, ResourceId};

/// Operational status of a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resource_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Can be offered.
    Available,
    /// Under maintenance.
    Maintenance,
    /// Withdrawn from service.
    OutOfService,
}

impl ResourceStatus {
    /// Resources in any other status are never offered, whatever the date.
    pub fn is_bookable(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// A concrete bookable unit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: ResourceId,
    /// Owning class.
    pub class_id: ResourceClassId,
    /// Room number or area label, used as the ordering tie-breaker.
    pub identifier: String,
    /// Resource status.
    pub status: ResourceStatus,
    /// When the resource was created.
    pub created_at: DateTime<Utc>,
    /// When the resource was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// Check if this unit can be offered.
    pub fn is_bookable(&self) -> bool {
        self.status.is_bookable()
    }
}
