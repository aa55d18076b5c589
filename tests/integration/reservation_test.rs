//! Integration tests for availability search and reservations over HTTP.

mod helpers;

use http::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;

use hotel_core::types::UserId;

#[tokio::test]
async fn test_health_reports_memory_store() {
    let app = helpers::TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], "memory");
}

#[tokio::test]
async fn test_anonymous_search_prices_the_stay() {
    let app = helpers::TestApp::new().await;
    let check_in = helpers::days_ahead(30);
    let check_out = helpers::days_ahead(33);

    let response = app
        .request(
            "GET",
            &format!("/api/availability?kind=room&start={check_in}&end={check_out}&party_size=2"),
            None,
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let free = response.body["data"].as_array().expect("list");
    assert_eq!(free.len(), 3);
    let room_101 = free
        .iter()
        .find(|r| r["identifier"] == "101")
        .expect("room 101");
    assert_eq!(room_101["total"], "300.00");
    assert!(free.iter().all(|r| r["kind"] == "room"));
}

#[tokio::test]
async fn test_search_rejects_malformed_window() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request(
            "GET",
            "/api/availability?start=2030-01-10&end=soon",
            None,
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert_eq!(response.body["field"], "end");
}

#[tokio::test]
async fn test_create_reservation_requires_sign_in() {
    let app = helpers::TestApp::new().await;
    let body = json!({
        "class_id": app.standard_id,
        "start": helpers::days_ahead(30).to_string(),
        "end": helpers::days_ahead(31).to_string(),
        "party_size": 1,
    });

    let response = app
        .request("POST", "/api/reservations", Some(body.clone()), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("POST", "/api/reservations", Some(body), Some("not-a-token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_list_and_cancel_reservation() {
    let app = helpers::TestApp::new().await;
    let token = app.token_for(UserId::new());

    let response = app
        .request(
            "POST",
            "/api/reservations",
            Some(json!({
                "class_id": app.suite_id,
                "start": helpers::days_ahead(40).to_string(),
                "end": helpers::days_ahead(42).to_string(),
                "party_size": 3,
                "notes": "Late arrival",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.money("total"), Decimal::new(50000, 2));
    assert_eq!(response.body["data"]["reservation"]["status"], "pending");
    let id = response.body["data"]["reservation_id"]
        .as_str()
        .expect("id")
        .to_string();

    let response = app
        .request("GET", "/api/reservations", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["total_items"], 1);
    assert_eq!(response.body["data"]["items"][0]["id"], id.as_str());

    let response = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/cancel"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["effective_status"], "cancelled");

    let response = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/cancel"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_sold_out_class_is_conflict() {
    let app = helpers::TestApp::new().await;
    let body = json!({
        "class_id": app.suite_id,
        "start": helpers::days_ahead(50).to_string(),
        "end": helpers::days_ahead(52).to_string(),
        "party_size": 2,
    });

    let first = app
        .request(
            "POST",
            "/api/reservations",
            Some(body.clone()),
            Some(&app.token_for(UserId::new())),
        )
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app
        .request(
            "POST",
            "/api/reservations",
            Some(body),
            Some(&app.token_for(UserId::new())),
        )
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_party_over_capacity_names_the_field() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/reservations",
            Some(json!({
                "class_id": app.standard_id,
                "start": helpers::days_ahead(30).to_string(),
                "end": helpers::days_ahead(31).to_string(),
                "party_size": 3,
            })),
            Some(&app.token_for(UserId::new())),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["field"], "party_size");
    assert_eq!(response.body["details"]["capacity"], 2);
}

#[tokio::test]
async fn test_retry_with_idempotency_key_replays() {
    let app = helpers::TestApp::new().await;
    let token = app.token_for(UserId::new());
    let body = json!({
        "class_id": app.sauna_id,
        "start": format!("{}T19:00", helpers::days_ahead(20)),
        "end": format!("{}T21:00", helpers::days_ahead(20)),
        "party_size": 2,
        "idempotency_key": "sauna-evening-1",
    });

    let first = app
        .request("POST", "/api/reservations", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(first.status, StatusCode::CREATED, "{:?}", first.body);
    assert_eq!(first.money("total"), Decimal::new(2500, 2));

    let retry = app
        .request("POST", "/api/reservations", Some(body), Some(&token))
        .await;
    assert_eq!(retry.status, StatusCode::OK);
    assert_eq!(retry.body["data"]["replayed"], true);
    assert_eq!(
        retry.body["data"]["reservation_id"],
        first.body["data"]["reservation_id"]
    );
}

#[tokio::test]
async fn test_other_guests_reservation_is_forbidden() {
    let app = helpers::TestApp::new().await;
    let owner = app.token_for(UserId::new());
    let created = app
        .request(
            "POST",
            "/api/reservations",
            Some(json!({
                "class_id": app.standard_id,
                "start": helpers::days_ahead(30).to_string(),
                "end": helpers::days_ahead(31).to_string(),
                "party_size": 1,
            })),
            Some(&owner),
        )
        .await;
    let id = created.body["data"]["reservation_id"]
        .as_str()
        .expect("id")
        .to_string();

    let stranger = app.token_for(UserId::new());
    let response = app
        .request("GET", &format!("/api/reservations/{id}"), None, Some(&stranger))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/cancel"),
            None,
            Some(&stranger),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
