//! A requester's own reservations.

use serde::Serialize;

use hotel_core::config::BookingConfig;
use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::{PageRequest, PageResponse, ReservationId};
use hotel_entity::LifecycleStatus;
use hotel_entity::reservation::Reservation;

use super::allocator::ReservationAllocator;
use crate::context::RequestContext;

/// A reservation as its owner sees it at request time.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationView {
    /// Stored record.
    #[serde(flatten)]
    pub reservation: Reservation,
    /// `completed` once a confirmed window has started.
    pub effective_status: LifecycleStatus,
}

impl ReservationView {
    /// View of a reservation at the context's instant.
    pub fn at(reservation: Reservation, ctx: &RequestContext, config: &BookingConfig) -> Self {
        let effective_status = reservation.effective_status(ctx.local_now(config));
        Self {
            reservation,
            effective_status,
        }
    }
}

impl ReservationAllocator {
    /// The requester's reservations, newest first.
    pub async fn list_reservations(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<ReservationView>> {
        let requester_id = ctx.requester_id()?;
        let (rows, total) = self
            .reservations
            .list_by_requester(requester_id, &page)
            .await?;
        let items = rows
            .into_iter()
            .map(|r| ReservationView::at(r, ctx, &self.config))
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    /// One of the requester's reservations.
    pub async fn get_reservation(
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
                "This reservation belongs to another guest",
            ));
        }
        Ok(ReservationView::at(reservation, ctx, &self.config))
    }
}
