use async_trait::async_trait;
use chrono::Utc;

use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::{BookingWindow, PageRequest, ReservationId, ResourceId, UserId};
use hotel_entity::LifecycleStatus;
use hotel_entity::reservation::{NewReservation, Reservation};

use super::MemoryStore;
use crate::error::billed_reservation;
use crate::store::{ReservationStore, Stored};

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn find_active_overlapping(
        &self,
        resource_ids: &[ResourceId],
        window: &BookingWindow,
    ) -> AppResult<Vec<Reservation>> {
        let state = self.state.lock().await;
        Ok(state
            .reservations
            .values()
            .filter(|r| {
                resource_ids.contains(&r.resource_id)
                    && r.holds_resource()
                    && r.window.overlaps(window)
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, new: NewReservation) -> AppResult<Stored<Reservation>> {
        let mut state = self.state.lock().await;

        if let Some(key) = new.idempotency_key.as_deref() {
            let existing = state.reservations.values().find(|r| {
                r.requester_id == new.requester_id && r.idempotency_key.as_deref() == Some(key)
            });
            if let Some(existing) = existing {
                return Ok(Stored::Replayed(existing.clone()));
            }
        }

        match state.is_bookable(new.resource_id) {
            None => {
                return Err(AppError::not_found(format!(
                    "Resource {} not found",
                    new.resource_id
                )));
            }
            Some(false) => {
                return Err(AppError::conflict(format!(
                    "Resource {} is no longer available",
                    new.resource_id
                )));
            }
            Some(true) => {}
        }

        let overlapping = state.reservations.values().any(|r| {
            r.resource_id == new.resource_id && r.holds_resource() && r.window.overlaps(&new.window)
        });
        if overlapping {
            return Err(AppError::conflict(format!(
                "Resource {} is already reserved for an overlapping window",
                new.resource_id
            )));
        }

        let reservation = new.into_reservation(Utc::now());
        state
            .reservations
            .insert(reservation.id, reservation.clone());
        Ok(Stored::Created(reservation))
    }

    async fn find_by_idempotency_key(
        &self,
        requester: UserId,
        key: &str,
    ) -> AppResult<Option<Reservation>> {
        let state = self.state.lock().await;
        Ok(state
            .reservations
            .values()
            .find(|r| r.requester_id == requester && r.idempotency_key.as_deref() == Some(key))
            .cloned())
    }

    async fn get(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        Ok(self.state.lock().await.reservations.get(&id).cloned())
    }

    async fn list_by_requester(
        &self,
        requester: UserId,
        page: &PageRequest,
    ) -> AppResult<(Vec<Reservation>, u64)> {
        let state = self.state.lock().await;
        let mut mine: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| r.requester_id == requester)
            .cloned()
            .collect();
        mine.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.into_uuid().cmp(&a.id.into_uuid()))
        });
        let total = mine.len() as u64;
        let items = mine
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn transition(
        &self,
        id: ReservationId,
        from: LifecycleStatus,
        to: LifecycleStatus,
    ) -> AppResult<Option<Reservation>> {
        let mut state = self.state.lock().await;
        match state.reservations.get_mut(&id) {
            Some(reservation) if reservation.status == from => {
                reservation.status = to;
                reservation.updated_at = Utc::now();
                Ok(Some(reservation.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn release(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        let mut state = self.state.lock().await;
        let pending = state
            .reservations
            .get(&id)
            .is_some_and(|r| r.status == LifecycleStatus::Pending);
        if !pending {
            return Ok(None);
        }
        if state.is_billed(id) {
            return Err(billed_reservation(id));
        }
        Ok(state.reservations.get_mut(&id).map(|reservation| {
            reservation.status = LifecycleStatus::Cancelled;
            reservation.updated_at = Utc::now();
            reservation.clone()
        }))
    }
}
