//! Catalog repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use hotel_core::error::AppError;
use hotel_core::result::AppResult;
use hotel_core::types::{CatalogItemId, ResourceClassId, ResourceId};
use hotel_entity::catalog::{CatalogItem, Resource, ResourceClass, ResourceClassRow};

use crate::error::db_err;
use crate::store::{CatalogGateway, ResourceFilter, ResourceWithClass};

/// Read-only repository over the catalog tables.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Create a new catalog repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogGateway for CatalogRepository {
    async fn get_resource_class(&self, id: ResourceClassId) -> AppResult<ResourceClass> {
        let row = sqlx::query_as::<_, ResourceClassRow>(
            "SELECT * FROM resource_classes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find resource class"))?
        .ok_or_else(|| AppError::not_found(format!("Resource class {id} not found")))?;

        ResourceClass::try_from(row)
    }

    async fn get_resource(&self, id: ResourceId) -> AppResult<Resource> {
        sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find resource"))?
            .ok_or_else(|| AppError::not_found(format!("Resource {id} not found")))
    }

    async fn get_catalog_item(&self, id: CatalogItemId) -> AppResult<CatalogItem> {
        sqlx::query_as::<_, CatalogItem>("SELECT * FROM catalog_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find catalog item"))?
            .ok_or_else(|| AppError::not_found(format!("Catalog item {id} not found")))
    }

    async fn list_resources(&self, filter: &ResourceFilter) -> AppResult<Vec<ResourceWithClass>> {
        let rows = sqlx::query_as::<_, ResourceClassRow>(
            "SELECT * FROM resource_classes \
             WHERE ($1::resource_kind IS NULL OR kind = $1) \
               AND ($2::uuid IS NULL OR id = $2)",
        )
        .bind(filter.kind)
        .bind(filter.class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list resource classes"))?;

        let mut classes = HashMap::with_capacity(rows.len());
        for row in rows {
            let class = ResourceClass::try_from(row)?;
            classes.insert(class.id, class);
        }
        if classes.is_empty() {
            return Ok(Vec::new());
        }

        let class_ids: Vec<ResourceClassId> = classes.keys().copied().collect();
        let resources = sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE class_id = ANY($1) ORDER BY identifier",
        )
        .bind(&class_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list resources"))?;

        Ok(resources
            .into_iter()
            .filter_map(|resource| {
                classes.get(&resource.class_id).map(|class| ResourceWithClass {
                    class: class.clone(),
                    resource,
                })
            })
            .collect())
    }
}
