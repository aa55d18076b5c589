//! Booking rule configuration.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Limits applied by the availability index, allocator and checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Longest room stay accepted, in nights.
    #[serde(default = "default_max_stay")]
    pub max_stay_nights: u32,
    /// How far ahead a window may start, in days.
    #[serde(default = "default_max_advance")]
    pub max_advance_days: u32,
    /// Offset of hotel-local time from UTC, in minutes.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
    /// Maximum number of lines accepted in one checkout cart.
    #[serde(default = "default_max_cart_lines")]
    pub max_cart_lines: usize,
    /// Largest quantity accepted on one drink line.
    #[serde(default = "default_max_line_quantity")]
    pub max_line_quantity: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_stay_nights: default_max_stay(),
            max_advance_days: default_max_advance(),
            utc_offset_minutes: default_utc_offset(),
            max_cart_lines: default_max_cart_lines(),
            max_line_quantity: default_max_line_quantity(),
        }
    }
}

impl BookingConfig {
    /// Check the values are usable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_stay_nights == 0 {
            return Err(AppError::configuration(
                "booking.max_stay_nights must be at least 1",
            ));
        }
        if self.max_cart_lines == 0 {
            return Err(AppError::configuration(
                "booking.max_cart_lines must be at least 1",
            ));
        }
        if self.max_line_quantity == 0 {
            return Err(AppError::configuration(
                "booking.max_line_quantity must be at least 1",
            ));
        }
        self.offset()?;
        Ok(())
    }

    /// Hotel-local timezone.
    pub fn offset(&self) -> Result<FixedOffset, AppError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::configuration(format!(
                "booking.utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }

    /// Convert an instant to hotel-local wall-clock time.
    pub fn local_time(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self.offset() {
            Ok(offset) => instant.with_timezone(&offset).naive_local(),
            Err(_) => instant.naive_utc(),
        }
    }
}

fn default_max_stay() -> u32 {
    30
}

fn default_max_advance() -> u32 {
    365
}

fn default_utc_offset() -> i32 {
    -180
}

fn default_max_cart_lines() -> usize {
    50
}

fn default_max_line_quantity() -> u32 {
    99
}
