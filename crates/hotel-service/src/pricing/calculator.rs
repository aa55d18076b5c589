//! Pricing calculator.
//!
//! Rooms are priced per night: `base × nights`, where nights is the window
//! length in days rounded up, at least 1 and at most the configured
//! maximum stay. Leisure areas cost a flat fee per booking whatever the
//! duration. Drink lines carry a quantity between 1 and the configured
//! per-line cap.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hotel_core::config::BookingConfig;
use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::money::{self, Money};
use hotel_core::types::BookingWindow;
use hotel_entity::catalog::{ResourceClass, ResourceKind};

/// How a quote was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    /// Per night, with the number of nights.
    Nights(u32),
    /// Flat fee per booking.
    Flat,
}

/// A priced window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Catalog price at quoting time.
    pub unit_price: Money,
    /// Nights or flat.
    pub basis: PriceBasis,
    /// Amount to charge.
    pub total: Money,
}

/// Computes monetary totals.
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    max_stay_nights: u32,
    max_line_quantity: u32,
}

impl PricingCalculator {
    /// Creates a calculator from booking configuration.
    pub fn new(config: &BookingConfig) -> Self {
        Self {
            max_stay_nights: config.max_stay_nights,
            max_line_quantity: config.max_line_quantity,
        }
    }

    /// Nights covered by a room window.
    pub fn nights(&self, window: &BookingWindow) -> AppResult<u32> {
        let nights = window.nights_spanned().max(1);
        if nights > i64::from(self.max_stay_nights) {
            return Err(AppError::validation(format!(
                "Stays are limited to {} nights, {nights} requested",
                self.max_stay_nights
            ))
            .with_field("window")
            .with_details(serde_json::json!({
                "max_stay_nights": self.max_stay_nights,
                "requested_nights": nights,
            })));
        }
        // Bounded by max_stay_nights, which is a u32.
        Ok(nights as u32)
    }

    /// Price a window on a class.
    pub fn price(&self, class: &ResourceClass, window: &BookingWindow) -> AppResult<Quote> {
        match class.kind {
            ResourceKind::Room => {
                let nights = self.nights(window)?;
                Ok(Quote {
                    unit_price: class.unit_price,
                    basis: PriceBasis::Nights(nights),
                    total: money::round_money(class.unit_price * Decimal::from(nights)),
                })
            }
            ResourceKind::LeisureArea => Ok(Quote {
                unit_price: class.unit_price,
                basis: PriceBasis::Flat,
                total: money::round_money(class.unit_price),
            }),
        }
    }

    /// Quantity for a drink line.
    pub fn quantity(&self, requested: Option<u32>) -> AppResult<u32> {
        match requested {
            Some(q) if (1..=self.max_line_quantity).contains(&q) => Ok(q),
            _ => Err(AppError::validation(format!(
                "Quantity must be between 1 and {}",
                self.max_line_quantity
            ))
            .with_field("quantity")
            .with_details(serde_json::json!({
                "max_line_quantity": self.max_line_quantity,
            }))),
        }
    }
}
