//! Integration tests for checkout and orders over HTTP.

mod helpers;

use http::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use hotel_core::types::UserId;

async fn book_standard(app: &helpers::TestApp, token: &str) -> String {
    let response = app
        .request(
            "POST",
            "/api/reservations",
            Some(json!({
                "class_id": app.standard_id,
                "start": helpers::days_ahead(30).to_string(),
                "end": helpers::days_ahead(32).to_string(),
                "party_size": 2,
            })),
            Some(token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body["data"]["reservation_id"]
        .as_str()
        .expect("id")
        .to_string()
}

#[tokio::test]
async fn test_checkout_bills_drinks_and_stay() {
    let app = helpers::TestApp::new().await;
    let token = app.token_for(UserId::new());
    let reservation_id = book_standard(&app, &token).await;

    let response = app
        .request(
            "POST",
            "/api/checkout",
            Some(json!({
                "lines": [
                    { "kind": "drink", "ref_id": app.caipirinha_id, "quantity": 2 },
                    { "kind": "reservation", "ref_id": reservation_id },
                ],
                "table_number": "7",
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.money("total"), Decimal::new(22000, 2));
    assert_eq!(response.body["data"]["line_count"], 2);
    assert_eq!(response.body["data"]["rejected_lines"], json!([]));

    let order_id = response.body["data"]["order_id"]
        .as_str()
        .expect("order id")
        .to_string();
    let response = app
        .request("GET", &format!("/api/orders/{order_id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", "/api/orders", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["total_items"], 1);
}

#[tokio::test]
async fn test_checkout_reports_rejected_lines() {
    let app = helpers::TestApp::new().await;
    let token = app.token_for(UserId::new());

    let response = app
        .request(
            "POST",
            "/api/checkout",
            Some(json!({
                "lines": [
                    { "kind": "drink", "ref_id": app.caipirinha_id, "quantity": 1 },
                    { "kind": "drink", "ref_id": app.chicha_id, "quantity": 1 },
                    { "kind": "drink", "ref_id": Uuid::new_v4(), "quantity": 1 },
                ],
            })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.money("total"), Decimal::new(1000, 2));
    let rejected = response.body["data"]["rejected_lines"]
        .as_array()
        .expect("rejected");
    assert_eq!(rejected.len(), 2);
    assert_eq!(rejected[0]["index"], 1);
    assert_eq!(rejected[1]["index"], 2);
}

#[tokio::test]
async fn test_checkout_with_nothing_valid_is_rejected() {
    let app = helpers::TestApp::new().await;
    let token = app.token_for(UserId::new());

    let response = app
        .request(
            "POST",
            "/api/checkout",
            Some(json!({
                "lines": [{ "kind": "drink", "ref_id": app.chicha_id, "quantity": 1 }],
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["field"], "lines");

    let response = app
        .request("POST", "/api/checkout", Some(json!({ "lines": [] })), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reservation_cannot_be_billed_twice() {
    let app = helpers::TestApp::new().await;
    let token = app.token_for(UserId::new());
    let reservation_id = book_standard(&app, &token).await;
    let body = json!({ "lines": [{ "kind": "reservation", "ref_id": reservation_id }] });

    let first = app
        .request("POST", "/api/checkout", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(first.status, StatusCode::CREATED, "{:?}", first.body);

    let second = app
        .request("POST", "/api/checkout", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        second.body["details"]["rejected_lines"][0]["reason"],
        "conflict"
    );

    let order_id = first.body["data"]["order_id"].as_str().expect("order id");
    let cancelled = app
        .request(
            "POST",
            &format!("/api/orders/{order_id}/cancel"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.body["data"]["status"], "cancelled");

    let third = app
        .request("POST", "/api/checkout", Some(body), Some(&token))
        .await;
    assert_eq!(third.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_billed_reservation_is_cancelled_after_its_order() {
    let app = helpers::TestApp::new().await;
    let token = app.token_for(UserId::new());
    let reservation_id = book_standard(&app, &token).await;

    let order = app
        .request(
            "POST",
            "/api/checkout",
            Some(json!({ "lines": [{ "kind": "reservation", "ref_id": reservation_id }] })),
            Some(&token),
        )
        .await;
    assert_eq!(order.status, StatusCode::CREATED, "{:?}", order.body);
    let order_id = order.body["data"]["order_id"].as_str().expect("order id");

    let cancel_path = format!("/api/reservations/{reservation_id}/cancel");
    let refused = app.request("POST", &cancel_path, None, Some(&token)).await;
    assert_eq!(refused.status, StatusCode::CONFLICT);
    assert_eq!(refused.body["details"]["reservation_id"], reservation_id.as_str());

    let response = app
        .request(
            "POST",
            &format!("/api/orders/{order_id}/cancel"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("POST", &cancel_path, None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["effective_status"], "cancelled");
}

#[tokio::test]
async fn test_stranger_cannot_bill_or_read_an_order() {
    let app = helpers::TestApp::new().await;
    let owner = app.token_for(UserId::new());
    let stranger = app.token_for(UserId::new());
    let reservation_id = book_standard(&app, &owner).await;

    let response = app
        .request(
            "POST",
            "/api/checkout",
            Some(json!({
                "lines": [
                    { "kind": "drink", "ref_id": app.caipirinha_id, "quantity": 1 },
                    { "kind": "reservation", "ref_id": reservation_id },
                ],
            })),
            Some(&stranger),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["data"]["rejected_lines"][0]["index"], 1);
    assert_eq!(
        response.body["data"]["rejected_lines"][0]["reason"],
        "authorization"
    );

    let order_id = response.body["data"]["order_id"].as_str().expect("order id");
    let response = app
        .request("GET", &format!("/api/orders/{order_id}"), None, Some(&owner))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("POST", "/api/checkout", Some(json!({ "lines": [] })), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_idempotent_checkout_replays() {
    let app = helpers::TestApp::new().await;
    let token = app.token_for(UserId::new());
    let body = json!({
        "lines": [{ "kind": "drink", "ref_id": app.caipirinha_id, "quantity": 3 }],
        "idempotency_key": "bar-tab-42",
    });

    let first = app
        .request("POST", "/api/checkout", Some(body.clone()), Some(&token))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let retry = app
        .request("POST", "/api/checkout", Some(body), Some(&token))
        .await;
    assert_eq!(retry.status, StatusCode::OK);
    assert_eq!(retry.body["data"]["replayed"], true);
    assert_eq!(retry.body["data"]["order_id"], first.body["data"]["order_id"]);
}
