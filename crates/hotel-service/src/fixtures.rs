//! Shared test hotel: a small catalog in a memory store and a fixed clock.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use hotel_auth::Requester;
use hotel_core::config::BookingConfig;
use hotel_core::types::{
    BookingWindow, CatalogItemId, ResourceClassId, ResourceId, UserId,
};
use hotel_database::MemoryStore;
use hotel_database::store::ReservationStore;
use hotel_entity::catalog::{
    CatalogItem, ClassStatus, Resource, ResourceClass, ResourceClassRow, ResourceKind,
    ResourceStatus,
};
use hotel_entity::reservation::{NewReservation, Reservation};

use crate::availability::AvailabilityIndex;
use crate::checkout::OrderAggregator;
use crate::context::RequestContext;
use crate::lifecycle::LifecycleService;
use crate::reservation::ReservationAllocator;

/// Stay window from check-in to check-out date.
pub fn day(check_in: &str, check_out: &str) -> BookingWindow {
    let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date");
    BookingWindow::nights(d(check_in), d(check_out)).expect("window")
}

/// Window between two local date-times.
pub fn at(start: &str, end: &str) -> BookingWindow {
    let t = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").expect("datetime");
    BookingWindow::new(t(start), t(end)).expect("window")
}

pub struct Hotel {
    pub store: MemoryStore,
    pub config: BookingConfig,
    pub standard: ResourceClass,
    pub suite: ResourceClass,
    pub room_101: ResourceId,
    pub room_102: ResourceId,
    pub room_201: ResourceId,
    pub pool: ResourceId,
    pub sauna: ResourceId,
    pub caipirinha: CatalogItemId,
    pub pisco: CatalogItemId,
    pub chicha: CatalogItemId,
}

impl Hotel {
    /// Rooms 101/102 (standard, 100.00, 2 guests) and 201 (suite, 250.00,
    /// 4 guests); pool (free, 08:00-22:00) and sauna (25.00, 18:00-02:00);
    /// three drinks, one of them off the menu.
    pub async fn new() -> Self {
        let store = MemoryStore::new();

        let standard = add_class(&store, ResourceKind::Room, "Standard", 10000, 2, json!({
            "amenities": ["Wi-Fi", "Ar-condicionado"],
            "gallery": ["standard-1.jpg"]
        }))
        .await;
        let suite = add_class(&store, ResourceKind::Room, "Suite Luxo", 25000, 4, json!({
            "amenities": ["Wi-Fi", "Banheira", "Vista para o mar"]
        }))
        .await;
        let pool_class = add_class(&store, ResourceKind::LeisureArea, "Piscina", 0, 20, json!({
            "operating_hours": { "open": "08:00", "close": "22:00" }
        }))
        .await;
        let sauna_class = add_class(&store, ResourceKind::LeisureArea, "Sauna", 2500, 6, json!({
            "operating_hours": { "open": "18:00", "close": "02:00" }
        }))
        .await;

        let room_101 = add_resource(&store, standard.id, "101").await;
        let room_102 = add_resource(&store, standard.id, "102").await;
        let room_201 = add_resource(&store, suite.id, "201").await;
        let pool = add_resource(&store, pool_class.id, "POOL").await;
        let sauna = add_resource(&store, sauna_class.id, "SAUNA").await;

        let caipirinha = add_item(&store, "Caipirinha", 1000, true).await;
        let pisco = add_item(&store, "Pisco Sour", 1500, true).await;
        let chicha = add_item(&store, "Chicha Morada", 800, false).await;

        Self {
            store,
            config: BookingConfig::default(),
            standard,
            suite,
            room_101,
            room_102,
            room_201,
            pool,
            sauna,
            caipirinha,
            pisco,
            chicha,
        }
    }

    /// 2024-04-20 12:00 hotel time (UTC-3).
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 20, 15, 0, 0)
            .single()
            .expect("fixed instant")
    }

    pub fn anonymous(&self) -> RequestContext {
        RequestContext::at(Requester::Anonymous, Self::now())
    }

    pub fn guest(&self, user: UserId) -> RequestContext {
        RequestContext::at(Requester::Authenticated(user), Self::now())
    }

    pub fn index(&self) -> AvailabilityIndex {
        AvailabilityIndex::new(
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            self.config.clone(),
        )
    }

    pub fn allocator(&self) -> ReservationAllocator {
        ReservationAllocator::new(
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.index()),
            self.config.clone(),
        )
    }

    pub fn aggregator(&self) -> OrderAggregator {
        OrderAggregator::new(
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            self.config.clone(),
        )
    }

    pub fn lifecycle(&self) -> LifecycleService {
        LifecycleService::new(
            Arc::new(self.store.clone()),
            Arc::new(self.store.clone()),
            self.config.clone(),
        )
    }

    /// Insert a pending reservation for a stranger, bypassing the allocator.
    pub async fn reserve_directly(&self, resource_id: ResourceId, window: BookingWindow) -> Reservation {
        self.reserve_for(UserId::new(), resource_id, window).await
    }

    /// Insert a pending reservation for `user`, bypassing the allocator.
    pub async fn reserve_for(
        &self,
        user: UserId,
        resource_id: ResourceId,
        window: BookingWindow,
    ) -> Reservation {
        let resource = hotel_database::CatalogGateway::get_resource(&self.store, resource_id)
            .await
            .expect("resource");
        let class = hotel_database::CatalogGateway::get_resource_class(&self.store, resource.class_id)
            .await
            .expect("class");
        self.store
            .insert(NewReservation {
                resource_id,
                class_id: class.id,
                resource_kind: class.kind,
                requester_id: user,
                window,
                party_size: 1,
                total: class.unit_price,
                notes: None,
                idempotency_key: None,
            })
            .await
            .expect("insert")
            .into_inner()
    }
}

async fn add_class(
    store: &MemoryStore,
    kind: ResourceKind,
    name: &str,
    cents: i64,
    capacity: i32,
    metadata: serde_json::Value,
) -> ResourceClass {
    store
        .add_class(ResourceClassRow {
            id: ResourceClassId::new(),
            kind,
            name: name.to_string(),
            unit_price: Decimal::new(cents, 2),
            capacity,
            metadata,
            status: ClassStatus::Available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await
        .expect("class")
}

async fn add_resource(store: &MemoryStore, class_id: ResourceClassId, identifier: &str) -> ResourceId {
    let id = ResourceId::new();
    store
        .add_resource(Resource {
            id,
            class_id,
            identifier: identifier.to_string(),
            status: ResourceStatus::Available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await
        .expect("resource");
    id
}

async fn add_item(store: &MemoryStore, name: &str, cents: i64, available: bool) -> CatalogItemId {
    let id = CatalogItemId::new();
    store
        .add_item(CatalogItem {
            id,
            name: name.to_string(),
            category: Some("bar".to_string()),
            price: Decimal::new(cents, 2),
            available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await;
    id
}
