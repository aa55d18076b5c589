//! In-process store guarded by a single Tokio mutex.
//!
//! Implements every storage trait over one shared state, so each trait
//! call is atomic with respect to every other. Suitable for tests and
//! single-node demos only; nothing is persisted.

mod catalog;
mod order;
mod reservation;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::{CatalogItemId, Money, OrderId, ReservationId, ResourceClassId, ResourceId};
use hotel_entity::catalog::{
    CatalogItem, ClassStatus, Resource, ResourceClass, ResourceClassRow, ResourceStatus,
};
use hotel_entity::order::OrderWithLines;
use hotel_entity::reservation::Reservation;

/// Everything the memory store holds.
#[derive(Debug, Default)]
struct MemoryState {
    classes: HashMap<ResourceClassId, ResourceClass>,
    resources: HashMap<ResourceId, Resource>,
    items: HashMap<CatalogItemId, CatalogItem>,
    reservations: HashMap<ReservationId, Reservation>,
    orders: HashMap<OrderId, OrderWithLines>,
}

/// In-memory implementation of the catalog, reservation and order stores.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource class, validating its metadata as the catalog would.
    pub async fn add_class(&self, row: ResourceClassRow) -> AppResult<ResourceClass> {
        let class = ResourceClass::try_from(row)?;
        self.state
            .lock()
            .await
            .classes
            .insert(class.id, class.clone());
        Ok(class)
    }

    /// Add a resource. Its class must already exist.
    pub async fn add_resource(&self, resource: Resource) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if !state.classes.contains_key(&resource.class_id) {
            return Err(AppError::not_found(format!(
                "Resource class {} not found",
                resource.class_id
            )));
        }
        state.resources.insert(resource.id, resource);
        Ok(())
    }

    /// Add a catalog item.
    pub async fn add_item(&self, item: CatalogItem) {
        self.state.lock().await.items.insert(item.id, item);
    }

    /// Change an item's current price.
    pub async fn set_item_price(&self, id: CatalogItemId, price: Money) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let item = state
            .items
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Catalog item {id} not found")))?;
        item.price = price;
        Ok(())
    }

    /// Toggle an item's availability.
    pub async fn set_item_available(&self, id: CatalogItemId, available: bool) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let item = state
            .items
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Catalog item {id} not found")))?;
        item.available = available;
        Ok(())
    }

    /// Change a resource's operational status.
    pub async fn set_resource_status(&self, id: ResourceId, status: ResourceStatus) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let resource = state
            .resources
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Resource {id} not found")))?;
        resource.status = status;
        Ok(())
    }

    /// Change a class's status.
    pub async fn set_class_status(&self, id: ResourceClassId, status: ClassStatus) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let class = state
            .classes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Resource class {id} not found")))?;
        class.status = status;
        Ok(())
    }
}

impl MemoryState {
    /// Whether the resource and its class are both offered.
    fn is_bookable(&self, resource_id: ResourceId) -> Option<bool> {
        let resource = self.resources.get(&resource_id)?;
        let class_ok = self
            .classes
            .get(&resource.class_id)
            .is_some_and(|c| c.status.is_bookable());
        Some(resource.is_bookable() && class_ok)
    }
}
