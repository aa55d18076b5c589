//! Structured metadata attached to a resource class.
//!
//! Stored as a JSONB document on the class row. Parsed once at the catalog
//! boundary; the rest of the engine only sees [`ClassMetadata`].
//!
//! Schema:
//!
//! ```json
//! {
//!   "amenities": ["Wi-Fi", "Ar-condicionado"],
//!   "gallery": ["deluxe-1.jpg"],
//!   "operating_hours": { "open": "08:00", "close": "22:00" }
//! }
//! ```
//!
//! Every key is optional. `operating_hours.close` earlier than `open`
//! means the area closes after midnight.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::BookingWindow;

/// Parsed class metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassMetadata {
    /// Amenity labels, in display order.
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Image file names, first one is the cover.
    #[serde(default)]
    pub gallery: Vec<String>,
    /// Opening hours for leisure areas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<OperatingHours>,
}

/// Daily opening hours in hotel-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    /// Opening time.
    #[serde(with = "hh_mm")]
    pub open: NaiveTime,
    /// Closing time; earlier than `open` when the area closes after midnight.
    #[serde(with = "hh_mm")]
    pub close: NaiveTime,
}

impl ClassMetadata {
    /// Parse and validate a stored metadata document.
    pub fn parse(value: &serde_json::Value) -> AppResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let mut metadata: Self = serde_json::from_value(value.clone()).map_err(|e| {
            AppError::validation(format!("Invalid class metadata: {e}")).with_field("metadata")
        })?;

        for (label, list) in [
            ("amenities", &mut metadata.amenities),
            ("gallery", &mut metadata.gallery),
        ] {
            for entry in list.iter_mut() {
                let trimmed = entry.trim();
                if trimmed.is_empty() {
                    return Err(AppError::validation(format!(
                        "Class metadata {label} contains an empty entry"
                    ))
                    .with_field("metadata"));
                }
                *entry = trimmed.to_string();
            }
        }

        if let Some(hours) = metadata.operating_hours {
            if hours.open == hours.close {
                return Err(AppError::validation(
                    "Operating hours must open and close at different times",
                )
                .with_field("metadata"));
            }
        }

        Ok(metadata)
    }

    /// Serialize back to the stored document shape.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    /// Cover image, if any.
    pub fn cover_image(&self) -> Option<&str> {
        self.gallery.first().map(String::as_str)
    }
}

impl OperatingHours {
    /// Whether the hours wrap past midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.close < self.open
    }

    /// Whether the whole window falls inside one opening period.
    pub fn admits(&self, window: &BookingWindow) -> bool {
        let (start, end) = (window.start(), window.end());
        if self.wraps_midnight() {
            self.admits_wrapping(start, end)
        } else {
            start.date() == end.date() && start.time() >= self.open && end.time() <= self.close
        }
    }

    fn admits_wrapping(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        let days = (end.date() - start.date()).num_days();
        match days {
            // Evening part [open, midnight) or early part [midnight, close).
            0 => start.time() >= self.open || end.time() <= self.close,
            // Crossing midnight inside one opening period.
            1 => start.time() >= self.open && end.time() <= self.close,
            _ => false,
        }
    }
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}
