//! Promotion management and the inventory availability read/write paths.

mod common;

use axum::http::{Method, StatusCode};
use common::{expect_status, TestApp};
use serde_json::{json, Value};

fn promotion_payload(code: &str, start: &str, end: &str) -> Value {
    json!({
        "promotionCode": code,
        "optionName": "Free home charger",
        "optionValue": "charger-7kw",
        "startDate": start,
        "endDate": end,
    })
}

#[tokio::test]
async fn promotion_crud_lifecycle() {
    let app = TestApp::new().await;
    let evm = app.evm_token();

    let start = chrono::Utc::now() - chrono::Duration::days(1);
    let end = chrono::Utc::now() + chrono::Duration::days(30);
    let response = app
        .request(
            Method::POST,
            "/api/Promotion",
            Some(&evm),
            Some(promotion_payload(
                "LAUNCH24",
                &start.to_rfc3339(),
                &end.to_rfc3339(),
            )),
        )
        .await;
    let body = expect_status(response, StatusCode::CREATED).await;
    let id = body["data"]["promotionId"].as_i64().unwrap();
    assert_eq!(body["data"]["promotionCode"], "LAUNCH24");
    assert_eq!(body["data"]["active"], true);

    let path = format!("/api/Promotion/{id}");
    let response = app.request(Method::GET, &path, Some(&evm), None).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["optionName"], "Free home charger");
    assert_eq!(body["data"]["optionValue"], "charger-7kw");

    let mut updated = promotion_payload("LAUNCH24", &start.to_rfc3339(), &end.to_rfc3339());
    updated["optionName"] = json!("Free wallbox installation");
    let response = app
        .request(Method::PUT, &path, Some(&evm), Some(updated))
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["optionName"], "Free wallbox installation");

    let response = app
        .request(Method::GET, "/api/Promotion", Some(&app.dealer_token()), None)
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app.request(Method::DELETE, &path, Some(&evm), None).await;
    expect_status(response, StatusCode::OK).await;
    let response = app.request(Method::GET, &path, Some(&evm), None).await;
    expect_status(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn duplicate_code_with_overlapping_window_is_rejected() {
    let app = TestApp::new().await;
    let evm = app.evm_token();

    let response = app
        .request(
            Method::POST,
            "/api/Promotion",
            Some(&evm),
            Some(promotion_payload(
                "SEASONAL",
                "2026-01-01T00:00:00Z",
                "2026-06-30T23:59:59Z",
            )),
        )
        .await;
    expect_status(response, StatusCode::CREATED).await;

    // Same code, overlapping window, different case.
    let response = app
        .request(
            Method::POST,
            "/api/Promotion",
            Some(&evm),
            Some(promotion_payload(
                "seasonal",
                "2026-06-01T00:00:00Z",
                "2026-12-31T23:59:59Z",
            )),
        )
        .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("overlapping active window"));

    // Same code with a disjoint window is a reuse, not a clash.
    let response = app
        .request(
            Method::POST,
            "/api/Promotion",
            Some(&evm),
            Some(promotion_payload(
                "SEASONAL",
                "2026-07-01T00:00:00Z",
                "2026-12-31T23:59:59Z",
            )),
        )
        .await;
    expect_status(response, StatusCode::CREATED).await;
}

#[tokio::test]
async fn expired_promotion_blocks_quotation_creation() {
    let app = TestApp::new().await;

    // SUMMER10 expired in January 2025.
    let response = app
        .request(
            Method::POST,
            "/api/Promotion",
            Some(&app.evm_token()),
            Some(promotion_payload(
                "SUMMER10",
                "2025-01-01T00:00:00Z",
                "2025-01-31T23:59:59Z",
            )),
        )
        .await;
    expect_status(response, StatusCode::CREATED).await;

    let response = app
        .request(
            Method::POST,
            "/api/SaleManagement/CreateQuotation",
            Some(&app.dealer_token()),
            Some(json!({
                "userId": 501,
                "vehicleId": 1,
                "color": "Pearl White",
                "basePrice": 1_000,
                "discount": 0,
                "promotionCode": "SUMMER10",
            })),
        )
        .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("invalid or inactive promotion code"));
}

#[tokio::test]
async fn promotion_writes_belong_to_evm_staff() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/Promotion",
            Some(&app.dealer_token()),
            Some(promotion_payload(
                "NOPE",
                "2026-01-01T00:00:00Z",
                "2026-12-31T23:59:59Z",
            )),
        )
        .await;
    expect_status(response, StatusCode::FORBIDDEN).await;
}

#[tokio::test]
async fn quantity_drives_availability() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("VF 8 Plus", "available").await;
    let evm = app.evm_token();
    let update_path = format!("/api/Inventory/{vehicle_id}/update");

    let response = app
        .request(
            Method::PUT,
            &update_path,
            Some(&evm),
            Some(json!({ "quantity": 2 })),
        )
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["quantity"], 2);
    assert_eq!(body["data"]["available"], true);
    assert_eq!(body["data"]["source"], "inventory");

    let response = app
        .request(
            Method::GET,
            &format!("/api/Inventory/{vehicle_id}"),
            Some(&app.dealer_token()),
            None,
        )
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["quantity"], 2);
    assert_eq!(body["data"]["available"], true);

    // Zero stock flips availability off even though the stored vehicle
    // status still says available.
    let response = app
        .request(
            Method::PUT,
            &update_path,
            Some(&evm),
            Some(json!({ "quantity": 0 })),
        )
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["available"], false);
}

#[tokio::test]
async fn missing_record_falls_back_to_vehicle_status() {
    let app = TestApp::new().await;
    let stocked = app.seed_vehicle("VF 8 Plus", "Available").await;
    let unstocked = app.seed_vehicle("VF 9 Eco", "out_of_stock").await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/Inventory/{stocked}"),
            Some(&app.dealer_token()),
            None,
        )
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["available"], true);
    assert_eq!(body["data"]["quantity"], 0);
    assert_eq!(body["data"]["source"], "vehicle_status");

    let response = app
        .request(
            Method::GET,
            &format!("/api/Inventory/{unstocked}"),
            Some(&app.dealer_token()),
            None,
        )
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["available"], false);

    let response = app
        .request(Method::GET, "/api/Inventory/999999", Some(&app.dealer_token()), None)
        .await;
    expect_status(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn dispatch_decrements_and_refuses_overdraw() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("VF 8 Plus", "available").await;
    let evm = app.evm_token();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/Inventory/{vehicle_id}/update"),
            Some(&evm),
            Some(json!({ "quantity": 3 })),
        )
        .await;
    expect_status(response, StatusCode::OK).await;

    let response = app
        .request(
            Method::POST,
            "/api/Inventory/dispatch",
            Some(&evm),
            Some(json!({ "vehicleId": vehicle_id, "quantity": 2, "dealerId": 42 })),
        )
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["quantity"], 1);
    assert_eq!(body["data"]["available"], true);

    let response = app
        .request(
            Method::POST,
            "/api/Inventory/dispatch",
            Some(&evm),
            Some(json!({ "vehicleId": vehicle_id, "quantity": 5, "dealerId": 42 })),
        )
        .await;
    let body = expect_status(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert!(body["message"].as_str().unwrap().contains("cannot dispatch"));

    // The failed dispatch changed nothing.
    let response = app
        .request(
            Method::GET,
            &format!("/api/Inventory/{vehicle_id}"),
            Some(&evm),
            None,
        )
        .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["data"]["quantity"], 1);

    let response = app
        .request(
            Method::POST,
            "/api/Inventory/dispatch",
            Some(&evm),
            Some(json!({ "vehicleId": vehicle_id, "quantity": 0, "dealerId": 42 })),
        )
        .await;
    expect_status(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn inventory_writes_belong_to_evm_staff() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("VF 8 Plus", "available").await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/Inventory/{vehicle_id}/update"),
            Some(&app.dealer_token()),
            Some(json!({ "quantity": 3 })),
        )
        .await;
    expect_status(response, StatusCode::FORBIDDEN).await;

    let response = app
        .request(Method::GET, "/api/Inventory", None, None)
        .await;
    expect_status(response, StatusCode::UNAUTHORIZED).await;
}
