//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{Days, NaiveDate, Utc};
use http::{Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use hotel_api::{AppState, build_router};
use hotel_auth::Claims;
use hotel_core::config::{AppConfig, DatabaseConfig};
use hotel_core::types::{CatalogItemId, ResourceClassId, ResourceId, UserId};
use hotel_database::{DatabasePool, MemoryStore};
use hotel_entity::catalog::{
    CatalogItem, ClassStatus, Resource, ResourceClassRow, ResourceKind, ResourceStatus,
};

/// Test application over an in-memory hotel.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store, for arranging state behind the API's back
    pub store: MemoryStore,
    /// Application config
    pub config: AppConfig,
    pub standard_id: ResourceClassId,
    pub suite_id: ResourceClassId,
    pub sauna_id: ResourceClassId,
    pub caipirinha_id: CatalogItemId,
    pub chicha_id: CatalogItemId,
}

impl TestApp {
    /// Rooms 101/102 (standard, 100.00) and 201 (suite, 250.00), a sauna
    /// open 18:00-02:00 at 25.00, and two drinks, one off the menu.
    pub async fn new() -> Self {
        let config = test_config();
        let store = MemoryStore::new();

        let standard_id = add_class(&store, ResourceKind::Room, "Standard", 10000, 2, json!({})).await;
        let suite_id = add_class(&store, ResourceKind::Room, "Suite Luxo", 25000, 4, json!({})).await;
        let sauna_id = add_class(&store, ResourceKind::LeisureArea, "Sauna", 2500, 6, json!({
            "operating_hours": { "open": "18:00", "close": "02:00" }
        }))
        .await;
        add_resource(&store, standard_id, "101").await;
        add_resource(&store, standard_id, "102").await;
        add_resource(&store, suite_id, "201").await;
        add_resource(&store, sauna_id, "SAUNA").await;

        let caipirinha_id = add_item(&store, "Caipirinha", 1000, true).await;
        let chicha_id = add_item(&store, "Chicha Morada", 800, false).await;

        let state = AppState::new(
            config.clone(),
            None,
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );
        let router = build_router(state);

        Self {
            router,
            store,
            config,
            standard_id,
            suite_id,
            sauna_id,
            caipirinha_id,
            chicha_id,
        }
    }

    /// Signed bearer token for `user`.
    pub fn token_for(&self, user: UserId) -> String {
        sign(&self.config.auth.jwt_secret, &self.config.auth.jwt_issuer, user)
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// Money field under `data`, parsed.
    pub fn money(&self, field: &str) -> Decimal {
        self.body["data"][field]
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| panic!("no money field '{field}' in {:?}", self.body))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::load_from("tests/fixtures", "test").expect("Failed to load test config")
}

pub fn sign(secret: &str, issuer: &str, user: UserId) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user,
        iss: issuer.to_string(),
        iat: now,
        exp: now + 3600,
        name: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign token")
}

/// A hotel-local date `days` from today, far enough out to be bookable.
pub fn days_ahead(days: u64) -> NaiveDate {
    Utc::now().date_naive() + Days::new(days)
}

/// PostgreSQL pool for the database named by `HOTEL_TEST_DATABASE_URL`,
/// migrated. `None` when the variable is unset.
pub async fn test_pool() -> Option<DatabasePool> {
    let url = std::env::var("HOTEL_TEST_DATABASE_URL").ok()?;
    let pool = DatabasePool::connect(&DatabaseConfig {
        url,
        max_connections: 20,
        min_connections: 1,
        connect_timeout_seconds: 10,
        idle_timeout_seconds: 60,
        statement_timeout_ms: 5000,
    })
    .await
    .expect("Failed to connect to test database");
    hotel_database::migration::run_migrations(pool.pool())
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

/// Insert a room class with `rooms` rooms. Identifiers are unique per call
/// so tests can share one database.
pub async fn seed_rooms(pool: &DatabasePool, cents: i64, rooms: usize) -> (ResourceClassId, Vec<ResourceId>) {
    let class_id = ResourceClassId::new();
    sqlx::query(
        "INSERT INTO resource_classes (id, kind, name, unit_price, capacity) \
         VALUES ($1, 'room', $2, $3, 2)",
    )
    .bind(class_id)
    .bind(format!("Standard {}", Uuid::new_v4().simple()))
    .bind(Decimal::new(cents, 2))
    .execute(pool.pool())
    .await
    .expect("Failed to insert class");

    let mut resources = Vec::with_capacity(rooms);
    for n in 0..rooms {
        let id = ResourceId::new();
        sqlx::query("INSERT INTO resources (id, class_id, identifier) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(class_id)
            .bind(format!("{}-{}", n + 1, Uuid::new_v4().simple()))
            .execute(pool.pool())
            .await
            .expect("Failed to insert resource");
        resources.push(id);
    }
    (class_id, resources)
}

async fn add_class(
    store: &MemoryStore,
    kind: ResourceKind,
    name: &str,
    cents: i64,
    capacity: i32,
    metadata: Value,
) -> ResourceClassId {
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
        .expect("Failed to add class")
        .id
}

async fn add_resource(store: &MemoryStore, class_id: ResourceClassId, identifier: &str) {
    store
        .add_resource(Resource {
            id: ResourceId::new(),
            class_id,
            identifier: identifier.to_string(),
            status: ResourceStatus::Available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await
        .expect("Failed to add resource");
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
