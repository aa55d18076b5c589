//! Lifecycle service.
//!
//! Stored transitions are `pending → confirmed` (staff) and
//! `pending → cancelled` (owner). `completed` is never stored; it is read
//! off a confirmed reservation once its window has started. Every write
//! is a compare-and-set on the status the caller saw, so a concurrent
//! transition turns into `Conflict` instead of being overwritten.

use std::sync::Arc;

use tracing::info;

use hotel_core::config::BookingConfig;
use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::{OrderId, ReservationId};
use hotel_database::store::{OrderStore, ReservationStore};
use hotel_entity::LifecycleStatus;
use hotel_entity::order::Order;

use crate::context::RequestContext;
use crate::reservation::ReservationView;

/// Applies lifecycle transitions.
#[derive(Debug, Clone)]
pub struct LifecycleService {
    /// Reservation store.
    reservations: Arc<dyn ReservationStore>,
    /// Order store.
    orders: Arc<dyn OrderStore>,
    /// Hotel clock.
    config: BookingConfig,
}

impl LifecycleService {
    /// Creates a new lifecycle service.
    pub fn new(
        reservations: Arc<dyn ReservationStore>,
        orders: Arc<dyn OrderStore>,
        config: BookingConfig,
    ) -> Self {
        Self {
            reservations,
            orders,
            config,
        }
    }

    /// Cancel one of the caller's pending reservations, releasing the
    /// resource immediately. Refused with `Conflict` while an open order
    /// bills it; cancelling that order first makes it cancellable.
    pub async fn cancel_reservation(
        &self,
        ctx: &RequestContext,
        id: ReservationId,
    ) -> AppResult<ReservationView> {
        let requester_id = ctx.requester_id()?;
        let reservation = self
            .reservations
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {id} not found")))?;
        if !reservation.is_owned_by(requester_id) {
            return Err(AppError::authorization(
                "Only the guest who made a reservation can cancel it",
            ));
        }
        let effective = reservation.effective_status(ctx.local_now(&self.config));
        ensure_transition(effective, LifecycleStatus::Cancelled, "Reservation")?;

        let cancelled = self
            .reservations
            .release(id)
            .await?
            .ok_or_else(|| changed_concurrently("Reservation"))?;

        info!(
            requester_id = %requester_id,
            reservation_id = %id,
            resource_id = %cancelled.resource_id,
            "Reservation cancelled"
        );
        Ok(ReservationView::at(cancelled, ctx, &self.config))
    }

    /// Staff confirmation of a pending reservation. Not reachable by
    /// guests.
    pub async fn confirm_reservation(
        &self,
        ctx: &RequestContext,
        id: ReservationId,
    ) -> AppResult<ReservationView> {
        let reservation = self
            .reservations
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {id} not found")))?;
        ensure_transition(reservation.status, LifecycleStatus::Confirmed, "Reservation")?;

        let confirmed = self
            .reservations
            .transition(id, LifecycleStatus::Pending, LifecycleStatus::Confirmed)
            .await?
            .ok_or_else(|| changed_concurrently("Reservation"))?;

        info!(reservation_id = %id, "Reservation confirmed");
        Ok(ReservationView::at(confirmed, ctx, &self.config))
    }

    /// Cancel one of the caller's pending orders. Reservations it billed
    /// become billable again.
    pub async fn cancel_order(&self, ctx: &RequestContext, id: OrderId) -> AppResult<Order> {
        let requester_id = ctx.requester_id()?;
        let order = self
            .orders
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
        if !order.order.is_owned_by(requester_id) {
            return Err(AppError::authorization(
                "Only the guest who placed an order can cancel it",
            ));
        }
        ensure_transition(order.order.status, LifecycleStatus::Cancelled, "Order")?;

        let cancelled = self
            .orders
            .transition(id, LifecycleStatus::Pending, LifecycleStatus::Cancelled)
            .await?
            .ok_or_else(|| changed_concurrently("Order"))?;

        info!(requester_id = %requester_id, order_id = %id, "Order cancelled");
        Ok(cancelled)
    }
}

fn ensure_transition(current: LifecycleStatus, next: LifecycleStatus, what: &str) -> AppResult<()> {
    if current.can_transition(next) {
        return Ok(());
    }
    Err(AppError::conflict(format!(
        "{what} is {current} and cannot become {next}"
    ))
    .with_details(serde_json::json!({ "status": current })))
}

fn changed_concurrently(what: &str) -> AppError {
    AppError::conflict(format!("{what} changed while it was being updated"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::CheckoutRequest;
    use crate::fixtures::{Hotel, day};
    use crate::reservation::AllocationRequest;
    use hotel_core::ErrorKind;
    use hotel_core::types::UserId;
    use hotel_entity::order::CartLine;

    #[tokio::test]
    async fn test_cancel_releases_the_resource() {
        let hotel = Hotel::new().await;
        let user = UserId::new();
        let guest = hotel.guest(user);
        let request = AllocationRequest {
            class_id: Some(hotel.suite.id),
            kind: None,
            window: day("2024-05-01", "2024-05-04"),
            party_size: 2,
            notes: None,
            idempotency_key: None,
        };
        let reservation = hotel
            .allocator()
            .allocate(&guest, request.clone())
            .await
            .expect("allocate")
            .into_inner();

        let view = hotel
            .lifecycle()
            .cancel_reservation(&guest, reservation.id)
            .await
            .expect("cancel");
        assert_eq!(view.effective_status, LifecycleStatus::Cancelled);

        // The suite has a single room, so this only succeeds if it was released.
        hotel
            .allocator()
            .allocate(&hotel.guest(UserId::new()), request)
            .await
            .expect("rebook");
    }

    #[tokio::test]
    async fn test_cancel_requires_owner_and_changes_nothing() {
        let hotel = Hotel::new().await;
        let reservation = hotel
            .reserve_directly(hotel.room_101, day("2024-05-01", "2024-05-02"))
            .await;

        let err = hotel
            .lifecycle()
            .cancel_reservation(&hotel.guest(UserId::new()), reservation.id)
            .await
            .expect_err("not owner");
        assert_eq!(err.kind, ErrorKind::Authorization);

        let stored = ReservationStore::get(&hotel.store, reservation.id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(stored.status, LifecycleStatus::Pending);

        let err = hotel
            .lifecycle()
            .cancel_reservation(&hotel.anonymous(), reservation.id)
            .await
            .expect_err("anonymous");
        assert_eq!(err.kind, ErrorKind::Authorization);

        let err = hotel
            .lifecycle()
            .cancel_reservation(&hotel.guest(UserId::new()), ReservationId::new())
            .await
            .expect_err("missing");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_terminal_states_are_final() {
        let hotel = Hotel::new().await;
        let user = UserId::new();
        let guest = hotel.guest(user);
        let reservation = hotel
            .reserve_for(user, hotel.room_101, day("2024-05-01", "2024-05-02"))
            .await;

        hotel
            .lifecycle()
            .cancel_reservation(&guest, reservation.id)
            .await
            .expect("cancel");
        let err = hotel
            .lifecycle()
            .cancel_reservation(&guest, reservation.id)
            .await
            .expect_err("cancel twice");
        assert_eq!(err.kind, ErrorKind::Conflict);

        let err = hotel
            .lifecycle()
            .confirm_reservation(&guest, reservation.id)
            .await
            .expect_err("confirm cancelled");
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_confirmed_reservation_cannot_be_cancelled() {
        let hotel = Hotel::new().await;
        let user = UserId::new();
        let guest = hotel.guest(user);
        let upcoming = hotel
            .reserve_for(user, hotel.room_101, day("2024-05-01", "2024-05-02"))
            .await;
        let started = hotel
            .reserve_for(user, hotel.room_102, day("2024-04-20", "2024-04-22"))
            .await;

        let view = hotel
            .lifecycle()
            .confirm_reservation(&guest, upcoming.id)
            .await
            .expect("confirm");
        assert_eq!(view.effective_status, LifecycleStatus::Confirmed);
        let err = hotel
            .lifecycle()
            .cancel_reservation(&guest, upcoming.id)
            .await
            .expect_err("confirmed");
        assert_eq!(err.kind, ErrorKind::Conflict);

        let view = hotel
            .lifecycle()
            .confirm_reservation(&guest, started.id)
            .await
            .expect("confirm");
        assert_eq!(view.effective_status, LifecycleStatus::Completed);
        let err = hotel
            .lifecycle()
            .cancel_reservation(&guest, started.id)
            .await
            .expect_err("completed");
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(
            err.details.expect("details")["status"],
            serde_json::json!("completed")
        );
    }

    #[tokio::test]
    async fn test_billed_reservation_waits_for_its_order() {
        let hotel = Hotel::new().await;
        let user = UserId::new();
        let guest = hotel.guest(user);
        let reservation = hotel
            .reserve_for(user, hotel.room_101, day("2024-05-01", "2024-05-03"))
            .await;
        let order = hotel
            .aggregator()
            .checkout(
                &guest,
                CheckoutRequest {
                    lines: vec![CartLine::reservation(reservation.id)],
                    ..Default::default()
                },
            )
            .await
            .expect("checkout")
            .order;

        let err = hotel
            .lifecycle()
            .cancel_reservation(&guest, reservation.id)
            .await
            .expect_err("billed");
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(
            err.details.expect("details")["reservation_id"],
            serde_json::json!(reservation.id)
        );
        let stored = ReservationStore::get(&hotel.store, reservation.id)
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(stored.status, LifecycleStatus::Pending);

        hotel
            .lifecycle()
            .cancel_order(&guest, order.order.id)
            .await
            .expect("cancel order");
        let view = hotel
            .lifecycle()
            .cancel_reservation(&guest, reservation.id)
            .await
            .expect("cancel reservation");
        assert_eq!(view.effective_status, LifecycleStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_order() {
        let hotel = Hotel::new().await;
        let user = UserId::new();
        let guest = hotel.guest(user);
        let order = hotel
            .aggregator()
            .checkout(
                &guest,
                CheckoutRequest {
                    lines: vec![CartLine::drink(hotel.pisco, 2)],
                    ..Default::default()
                },
            )
            .await
            .expect("checkout")
            .order;

        let err = hotel
            .lifecycle()
            .cancel_order(&hotel.guest(UserId::new()), order.order.id)
            .await
            .expect_err("not owner");
        assert_eq!(err.kind, ErrorKind::Authorization);

        let cancelled = hotel
            .lifecycle()
            .cancel_order(&guest, order.order.id)
            .await
            .expect("cancel");
        assert_eq!(cancelled.status, LifecycleStatus::Cancelled);

        let err = hotel
            .lifecycle()
            .cancel_order(&guest, order.order.id)
            .await
            .expect_err("twice");
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
