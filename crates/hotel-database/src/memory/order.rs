use async_trait::async_trait;
use chrono::Utc;

use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::{OrderId, PageRequest, ReservationId, UserId};
use hotel_entity::LifecycleStatus;
use hotel_entity::order::{NewOrder, Order, OrderWithLines};

use super::{MemoryState, MemoryStore};
use crate::store::{OrderStore, Stored};

impl MemoryState {
    pub(super) fn is_billed(&self, reservation_id: ReservationId) -> bool {
        self.orders.values().any(|o| {
            o.order.status != LifecycleStatus::Cancelled
                && o.lines
                    .iter()
                    .any(|l| l.reservation_id == Some(reservation_id))
        })
    }

    fn find_order_by_key(&self, requester: UserId, key: &str) -> Option<&OrderWithLines> {
        self.orders.values().find(|o| {
            o.order.requester_id == requester && o.order.idempotency_key.as_deref() == Some(key)
        })
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, new: NewOrder) -> AppResult<Stored<OrderWithLines>> {
        let mut state = self.state.lock().await;

        if let Some(key) = new.idempotency_key.as_deref() {
            if let Some(existing) = state.find_order_by_key(new.requester_id, key) {
                return Ok(Stored::Replayed(existing.clone()));
            }
        }

        for reservation_id in new.lines.iter().filter_map(|l| l.reservation_id) {
            let details = serde_json::json!({ "reservation_id": reservation_id });
            let billable = state.reservations.get(&reservation_id).is_some_and(|r| {
                r.requester_id == new.requester_id && r.status == LifecycleStatus::Pending
            });
            if !billable {
                return Err(AppError::conflict(format!(
                    "Reservation {reservation_id} can no longer be billed"
                ))
                .with_field("lines")
                .with_details(details));
            }
            if state.is_billed(reservation_id) {
                return Err(AppError::conflict(format!(
                    "Reservation {reservation_id} is already billed by another order"
                ))
                .with_field("lines")
                .with_details(details));
            }
        }

        let stored = new.into_order(Utc::now());
        state.orders.insert(stored.order.id, stored.clone());
        Ok(Stored::Created(stored))
    }

    async fn find_by_idempotency_key(
        &self,
        requester: UserId,
        key: &str,
    ) -> AppResult<Option<OrderWithLines>> {
        let state = self.state.lock().await;
        Ok(state.find_order_by_key(requester, key).cloned())
    }

    async fn get(&self, id: OrderId) -> AppResult<Option<OrderWithLines>> {
        Ok(self.state.lock().await.orders.get(&id).cloned())
    }

    async fn list_by_requester(
        &self,
        requester: UserId,
        page: &PageRequest,
    ) -> AppResult<(Vec<Order>, u64)> {
        let state = self.state.lock().await;
        let mut mine: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.order.requester_id == requester)
            .map(|o| o.order.clone())
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
        id: OrderId,
        from: LifecycleStatus,
        to: LifecycleStatus,
    ) -> AppResult<Option<Order>> {
        let mut state = self.state.lock().await;
        match state.orders.get_mut(&id) {
            Some(stored) if stored.order.status == from => {
                stored.order.status = to;
                stored.order.updated_at = Utc::now();
                Ok(Some(stored.order.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn billed_reservations(&self, ids: &[ReservationId]) -> AppResult<Vec<ReservationId>> {
        let state = self.state.lock().await;
        Ok(ids.iter().copied().filter(|id| state.is_billed(*id)).collect())
    }
}
