//! Order line entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hotel_core::types::money::line_total;
use hotel_core::types::{CatalogItemId, Money, OrderId, OrderLineId, ReservationId};

/// What an order line bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_line_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderLineKind {
    /// A catalog item.
    Drink,
    /// A previously allocated reservation.
    Reservation,
}

/// One billed line of an order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderLine {
    /// Unique line identifier.
    pub id: OrderLineId,
    /// Owning order.
    pub order_id: OrderId,
    /// Drink or reservation.
    pub kind: OrderLineKind,
    /// Set for drink lines.
    pub catalog_item_id: Option<CatalogItemId>,
    /// Set for reservation lines.
    pub reservation_id: Option<ReservationId>,
    /// Item name or reservation summary at purchase time.
    pub description: String,
    /// Quantity, at least 1.
    #[sqlx(try_from = "i32")]
    pub quantity: u32,
    /// Price frozen at purchase time.
    pub unit_price: Money,
    /// `unit_price × quantity`.
    pub line_total: Money,
    /// When the line was created.
    pub created_at: DateTime<Utc>,
}

/// A priced line ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrderLine {
    /// Drink or reservation.
    pub kind: OrderLineKind,
    /// Set for drink lines.
    pub catalog_item_id: Option<CatalogItemId>,
    /// Set for reservation lines.
    pub reservation_id: Option<ReservationId>,
    /// Item name or reservation summary.
    pub description: String,
    /// Quantity, at least 1.
    pub quantity: u32,
    /// Snapshot price.
    pub unit_price: Money,
}

impl NewOrderLine {
    /// A drink line at the catalog's current price.
    pub fn drink(
        item_id: CatalogItemId,
        description: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            kind: OrderLineKind::Drink,
            catalog_item_id: Some(item_id),
            reservation_id: None,
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// A reservation folded into the order, billed once at its total.
    pub fn reservation(
        reservation_id: ReservationId,
        description: impl Into<String>,
        total: Money,
    ) -> Self {
        Self {
            kind: OrderLineKind::Reservation,
            catalog_item_id: None,
            reservation_id: Some(reservation_id),
            description: description.into(),
            quantity: 1,
            unit_price: total,
        }
    }

    /// `unit_price × quantity`, rounded to cents.
    pub fn line_total(&self) -> Money {
        line_total(self.unit_price, self.quantity)
    }

    /// Materialize the stored line.
    pub fn into_line(self, order_id: OrderId, now: DateTime<Utc>) -> OrderLine {
        let total = self.line_total();
        OrderLine {
            id: OrderLineId::new(),
            order_id,
            kind: self.kind,
            catalog_item_id: self.catalog_item_id,
            reservation_id: self.reservation_id,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            line_total: total,
            created_at: now,
        }
    }
}
