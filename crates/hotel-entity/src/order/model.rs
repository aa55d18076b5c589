//! Order header entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hotel_core::types::money;
use hotel_core::types::{Money, OrderId, UserId};

use super::line::{NewOrderLine, OrderLine};
use crate::lifecycle::LifecycleStatus;

/// A checkout transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Owner.
    pub requester_id: UserId,
    /// Sum of line totals at creation.
    pub total: Money,
    /// Stored lifecycle status.
    pub status: LifecycleStatus,
    /// Bar table, if served at a table.
    pub table_number: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Caller-supplied retry token.
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Check if the order belongs to the given requester.
    pub fn is_owned_by(&self, requester: UserId) -> bool {
        self.requester_id == requester
    }
}

/// An order with its lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithLines {
    /// Header.
    #[serde(flatten)]
    pub order: Order,
    /// Lines in insertion order.
    pub lines: Vec<OrderLine>,
}

/// Data required to insert an order. Always starts as `pending`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Owner.
    pub requester_id: UserId,
    /// Priced lines, at least one.
    pub lines: Vec<NewOrderLine>,
    /// Bar table.
    pub table_number: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Caller-supplied retry token.
    pub idempotency_key: Option<String>,
}

impl NewOrder {
    /// Order total, recomputed from the lines.
    pub fn total(&self) -> Money {
        money::sum(self.lines.iter().map(NewOrderLine::line_total))
    }

    /// Materialize header and lines as they will be stored.
    pub fn into_order(self, now: DateTime<Utc>) -> OrderWithLines {
        let id = OrderId::new();
        let total = self.total();
        let lines = self
            .lines
            .into_iter()
            .map(|line| line.into_line(id, now))
            .collect();
        OrderWithLines {
            order: Order {
                id,
                requester_id: self.requester_id,
                total,
                status: LifecycleStatus::Pending,
                table_number: self.table_number,
                notes: self.notes,
                idempotency_key: self.idempotency_key,
                created_at: now,
                updated_at: now,
            },
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_core::types::{CatalogItemId, ReservationId};
    use rust_decimal::Decimal;

    #[test]
    fn test_total_is_sum_of_line_totals() {
        let order = NewOrder {
            requester_id: UserId::new(),
            lines: vec![
                NewOrderLine::drink(CatalogItemId::new(), "Caipirinha", 2, Decimal::new(1000, 2)),
                NewOrderLine::drink(CatalogItemId::new(), "Pisco Sour", 1, Decimal::new(1500, 2)),
                NewOrderLine::reservation(ReservationId::new(), "Quarto 101", Decimal::new(30000, 2)),
            ],
            table_number: Some("7".to_string()),
            notes: None,
            idempotency_key: None,
        };
        assert_eq!(order.total(), Decimal::new(33500, 2));

        let stored = order.into_order(Utc::now());
        assert_eq!(stored.order.total, Decimal::new(33500, 2));
        assert_eq!(stored.order.status, LifecycleStatus::Pending);
        assert_eq!(stored.lines.len(), 3);
        assert!(stored.lines.iter().all(|l| l.order_id == stored.order.id));
        assert_eq!(stored.lines[0].line_total, Decimal::new(2000, 2));
        assert_eq!(stored.lines[2].quantity, 1);
    }
}
