//! Resource class entity: a room type or a leisure area type.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hotel_core::error::AppError;
use hotel_core::types::{Money, ResourceClassId, WindowGranularity};

use super::metadata::ClassMetadata;

/// What kind of thing a class describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resource_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Guest room, booked per night.
    Room,
    /// Leisure area (pool, sauna, court), booked per slot.
    LeisureArea,
}

impl ResourceKind {
    /// Granularity at which windows for this kind are checked against "now".
    pub fn granularity(&self) -> WindowGranularity {
        match self {
            Self::Room => WindowGranularity::Date,
            Self::LeisureArea => WindowGranularity::DateTime,
        }
    }

    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Room => "room",
            Self::LeisureArea => "leisure_area",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "room" => Ok(Self::Room),
            "leisure_area" | "leisure" => Ok(Self::LeisureArea),
            _ => Err(AppError::validation(format!(
                "Invalid resource kind: '{s}'. Expected one of: room, leisure_area"
            ))
            .with_field("kind")),
        }
    }
}

/// Whether a class is currently offered at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "class_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    /// Offered.
    Available,
    /// Temporarily withdrawn.
    Maintenance,
}

impl ClassStatus {
    /// Check if resources of this class may be offered.
    pub fn is_bookable(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Raw resource class row, metadata still as stored JSON.
#[derive(Debug, Clone, FromRow)]
pub struct ResourceClassRow {
    /// Unique class identifier.
    pub id: ResourceClassId,
    /// Room or leisure area.
    pub kind: ResourceKind,
    /// Display name.
    pub name: String,
    /// Nightly price for rooms, flat fee for leisure areas.
    pub unit_price: Money,
    /// Maximum party size.
    pub capacity: i32,
    /// Stored metadata document.
    pub metadata: serde_json::Value,
    /// Class status.
    pub status: ClassStatus,
    /// When the class was created.
    pub created_at: DateTime<Utc>,
    /// When the class was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A validated resource class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceClass {
    /// Unique class identifier.
    pub id: ResourceClassId,
    /// Room or leisure area.
    pub kind: ResourceKind,
    /// Display name.
    pub name: String,
    /// Nightly price for rooms, flat fee for leisure areas.
    pub unit_price: Money,
    /// Maximum party size, always at least 1.
    pub capacity: u32,
    /// Parsed metadata.
    pub metadata: ClassMetadata,
    /// Class status.
    pub status: ClassStatus,
    /// When the class was created.
    pub created_at: DateTime<Utc>,
    /// When the class was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ResourceClass {
    /// Check whether a party of the given size fits.
    pub fn fits(&self, party_size: u32) -> bool {
        party_size <= self.capacity
    }
}

impl TryFrom<ResourceClassRow> for ResourceClass {
    type Error = AppError;

    fn try_from(row: ResourceClassRow) -> Result<Self, Self::Error> {
        let capacity = u32::try_from(row.capacity)
            .ok()
            .filter(|c| *c >= 1)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Resource class '{}' has invalid capacity {}",
                    row.name, row.capacity
                ))
                .with_field("capacity")
            })?;
        if row.unit_price.is_sign_negative() {
            return Err(AppError::validation(format!(
                "Resource class '{}' has a negative price",
                row.name
            ))
            .with_field("unit_price"));
        }
        let metadata = ClassMetadata::parse(&row.metadata)?;

        Ok(Self {
            id: row.id,
            kind: row.kind,
            name: row.name,
            unit_price: row.unit_price,
            capacity,
            metadata,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
