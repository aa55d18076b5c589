use async_trait::async_trait;

use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::{CatalogItemId, ResourceClassId, ResourceId};
use hotel_entity::catalog::{CatalogItem, Resource, ResourceClass};

use super::MemoryStore;
use crate::store::{CatalogGateway, ResourceFilter, ResourceWithClass};

#[async_trait]
impl CatalogGateway for MemoryStore {
    async fn get_resource_class(&self, id: ResourceClassId) -> AppResult<ResourceClass> {
        self.state
            .lock()
            .await
            .classes
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Resource class {id} not found")))
    }

    async fn get_resource(&self, id: ResourceId) -> AppResult<Resource> {
        self.state
            .lock()
            .await
            .resources
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Resource {id} not found")))
    }

    async fn get_catalog_item(&self, id: CatalogItemId) -> AppResult<CatalogItem> {
        self.state
            .lock()
            .await
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Catalog item {id} not found")))
    }

    async fn list_resources(&self, filter: &ResourceFilter) -> AppResult<Vec<ResourceWithClass>> {
        let state = self.state.lock().await;
        let mut out: Vec<ResourceWithClass> = state
            .resources
            .values()
            .filter_map(|resource| {
                let class = state.classes.get(&resource.class_id)?;
                let kind_ok = filter.kind.is_none_or(|k| k == class.kind);
                let class_ok = filter.class_id.is_none_or(|id| id == class.id);
                (kind_ok && class_ok).then(|| ResourceWithClass {
                    resource: resource.clone(),
                    class: class.clone(),
                })
            })
            .collect();
        out.sort_by(|a, b| a.resource.identifier.cmp(&b.resource.identifier));
        Ok(out)
    }
}
