//! Storage seams used by the booking engine.
//!
//! The engine talks to storage only through these traits. PostgreSQL
//! repositories implement them for production; [`crate::MemoryStore`]
//! implements them in-process for tests and single-node demos.
//!
//! The atomicity contracts live here, not in the engine: an
//! implementation must make `ReservationStore::insert` and
//! `OrderStore::insert` all-or-nothing under concurrent callers.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::Serialize;

use hotel_core::result::AppResult;
use hotel_core::types::{
    BookingWindow, CatalogItemId, OrderId, PageRequest, ReservationId, ResourceClassId,
    ResourceId, UserId,
};
use hotel_entity::LifecycleStatus;
use hotel_entity::catalog::{CatalogItem, Resource, ResourceClass, ResourceKind};
use hotel_entity::order::{NewOrder, Order, OrderWithLines};
use hotel_entity::reservation::{NewReservation, Reservation};

/// Which resources a listing should cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    /// Only resources of this kind.
    pub kind: Option<ResourceKind>,
    /// Only resources of this class.
    pub class_id: Option<ResourceClassId>,
}

/// A resource joined with its class.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceWithClass {
    /// The concrete unit.
    pub resource: Resource,
    /// Its validated class.
    pub class: ResourceClass,
}

/// Outcome of an insert that honours idempotency keys.
#[derive(Debug, Clone)]
pub enum Stored<T> {
    /// A new record was written.
    Created(T),
    /// A record with the same requester and key already existed; nothing
    /// was written.
    Replayed(T),
}

impl<T> Stored<T> {
    /// Whether this was a replay of an earlier call.
    pub fn is_replay(&self) -> bool {
        matches!(self, Self::Replayed(_))
    }

    /// The record, however it was obtained.
    pub fn into_inner(self) -> T {
        match self {
            Self::Created(v) | Self::Replayed(v) => v,
        }
    }
}

/// Read-only access to catalog definitions.
///
/// Class metadata is parsed and validated here, so callers only ever see
/// [`ResourceClass`] values with a well-formed `ClassMetadata`.
#[async_trait]
pub trait CatalogGateway: Send + Sync + Debug {
    /// Fetch a resource class. `NotFound` when missing.
    async fn get_resource_class(&self, id: ResourceClassId) -> AppResult<ResourceClass>;

    /// Fetch a resource. `NotFound` when missing.
    async fn get_resource(&self, id: ResourceId) -> AppResult<Resource>;

    /// Fetch a catalog item. `NotFound` when missing.
    async fn get_catalog_item(&self, id: CatalogItemId) -> AppResult<CatalogItem>;

    /// List resources matching the filter, whatever their status.
    async fn list_resources(&self, filter: &ResourceFilter) -> AppResult<Vec<ResourceWithClass>>;
}

/// Persistence for reservations.
#[async_trait]
pub trait ReservationStore: Send + Sync + Debug {
    /// Active (`pending`/`confirmed`) reservations on any of the given
    /// resources whose window overlaps `window`.
    async fn find_active_overlapping(
        &self,
        resource_ids: &[ResourceId],
        window: &BookingWindow,
    ) -> AppResult<Vec<Reservation>>;

    /// Insert a `pending` reservation.
    ///
    /// Atomically re-checks that the resource is still bookable and that
    /// no active reservation on it overlaps the window; fails with
    /// `Conflict` otherwise and writes nothing. When the requester already
    /// has a reservation under the same idempotency key, returns it as
    /// [`Stored::Replayed`].
    async fn insert(&self, new: NewReservation) -> AppResult<Stored<Reservation>>;

    /// Look up a reservation by requester and idempotency key.
    async fn find_by_idempotency_key(
        &self,
        requester: UserId,
        key: &str,
    ) -> AppResult<Option<Reservation>>;

    /// Fetch a reservation.
    async fn get(&self, id: ReservationId) -> AppResult<Option<Reservation>>;

    /// A requester's reservations, newest first, with the total count.
    async fn list_by_requester(
        &self,
        requester: UserId,
        page: &PageRequest,
    ) -> AppResult<(Vec<Reservation>, u64)>;

    /// Compare-and-set the status. `None` when the stored status was not
    /// `from`.
    async fn transition(
        &self,
        id: ReservationId,
        from: LifecycleStatus,
        to: LifecycleStatus,
    ) -> AppResult<Option<Reservation>>;

    /// Cancel a `pending` reservation. `None` when it is no longer
    /// pending; `Conflict` while a non-cancelled order bills it. The
    /// billing check and the update are atomic with respect to order
    /// inserts.
    async fn release(&self, id: ReservationId) -> AppResult<Option<Reservation>>;
}

/// Persistence for orders.
#[async_trait]
pub trait OrderStore: Send + Sync + Debug {
    /// Insert a `pending` order with its lines.
    ///
    /// Every reservation line is re-checked under lock: still `pending`,
    /// owned by the order's requester, and not billed by another
    /// non-cancelled order. Any failure is a `Conflict` and nothing is
    /// written. Idempotency keys behave as for reservations.
    async fn insert(&self, new: NewOrder) -> AppResult<Stored<OrderWithLines>>;

    /// Look up an order by requester and idempotency key.
    async fn find_by_idempotency_key(
        &self,
        requester: UserId,
        key: &str,
    ) -> AppResult<Option<OrderWithLines>>;

    /// Fetch an order with its lines.
    async fn get(&self, id: OrderId) -> AppResult<Option<OrderWithLines>>;

    /// A requester's orders, newest first, with the total count.
    async fn list_by_requester(
        &self,
        requester: UserId,
        page: &PageRequest,
    ) -> AppResult<(Vec<Order>, u64)>;

    /// Compare-and-set the status. `None` when the stored status was not
    /// `from`.
    async fn transition(
        &self,
        id: OrderId,
        from: LifecycleStatus,
        to: LifecycleStatus,
    ) -> AppResult<Option<Order>>;

    /// Those of the given reservations already billed by a non-cancelled
    /// order.
    async fn billed_reservations(&self, ids: &[ReservationId]) -> AppResult<Vec<ReservationId>>;
}
