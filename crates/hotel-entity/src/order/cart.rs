//! Cart value passed into checkout.
//!
//! The cart is advisory input built on the client; every line is
//! re-validated against current catalog and reservation state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hotel_core::error::ErrorKind;

/// What a cart line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartLineKind {
    /// `ref_id` is a catalog item id.
    Drink,
    /// `ref_id` is a reservation id.
    Reservation,
}

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Drink or reservation.
    pub kind: CartLineKind,
    /// Catalog item id or reservation id.
    pub ref_id: Uuid,
    /// Required for drinks; ignored (always 1) for reservations.
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl CartLine {
    /// Drink line.
    pub fn drink(item_id: impl Into<Uuid>, quantity: u32) -> Self {
        Self {
            kind: CartLineKind::Drink,
            ref_id: item_id.into(),
            quantity: Some(quantity),
        }
    }

    /// Reservation line.
    pub fn reservation(reservation_id: impl Into<Uuid>) -> Self {
        Self {
            kind: CartLineKind::Reservation,
            ref_id: reservation_id.into(),
            quantity: None,
        }
    }
}

/// A cart line excluded from the order, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLine {
    /// Zero-based position in the submitted cart.
    pub index: usize,
    /// Line kind as submitted.
    pub kind: CartLineKind,
    /// Reference as submitted.
    pub ref_id: Uuid,
    /// Error category.
    pub reason: ErrorKind,
    /// Human-readable explanation.
    pub message: String,
}
