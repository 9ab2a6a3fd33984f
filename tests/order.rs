mod common;

use common::{bearer, forged, json_body, spawn_app};
use reqwest::{header, StatusCode};
use serde_json::json;

const EXISTING_ORDER: &str = "/orders/1";
const OTHER_CLIENTS_ORDER: &str = "/orders/2";
const MISSING_ORDER: &str = "/orders/100";

#[tokio::test]
async fn find_by_id_returns_order_when_admin_logged() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = bearer(app.get(EXISTING_ORDER), &token)
        .send()
        .await
        .expect("Failed to send get order request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["moment"], "2022-07-25T13:00:00Z");
    assert_eq!(body["status"], "PAID");
    assert_eq!(body["client"]["name"], "Maria Brown");
    assert!(body["payment"].is_object());
    assert_eq!(body["items"][1]["name"], "Macbook Pro");
    assert_eq!(body["total"].as_f64(), Some(1431.0));
}

#[tokio::test]
async fn find_by_id_returns_order_when_owner_logged() {
    let app = spawn_app().await;
    let token = app.client_token().await;

    let response = bearer(app.get(EXISTING_ORDER), &token)
        .send()
        .await
        .expect("Failed to send get order request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["moment"], "2022-07-25T13:00:00Z");
    assert_eq!(body["status"], "PAID");
    assert_eq!(body["client"]["id"], 1);
    assert_eq!(body["payment"]["moment"], "2022-07-25T15:00:00Z");
    assert_eq!(body["items"][0]["name"], "The Lord of the Rings");
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["items"][0]["subTotal"].as_f64(), Some(181.0));
    assert_eq!(body["items"][1]["name"], "Macbook Pro");
}

#[tokio::test]
async fn unpaid_order_has_null_payment() {
    let app = spawn_app().await;
    let token = app.client_token().await;

    let response = bearer(app.get("/orders/3"), &token)
        .send()
        .await
        .expect("Failed to send get order request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "WAITING_PAYMENT");
    assert!(body["payment"].is_null());
    assert_eq!(body["total"].as_f64(), Some(90.5));
}

#[tokio::test]
async fn find_by_id_is_forbidden_when_order_belongs_to_someone_else() {
    let app = spawn_app().await;
    let token = app.client_token().await;

    let response = bearer(app.get(OTHER_CLIENTS_ORDER), &token)
        .send()
        .await
        .expect("Failed to send get order request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn find_by_id_returns_not_found_for_missing_order() {
    let app = spawn_app().await;

    for token in [app.admin_token().await, app.client_token().await] {
        let response = bearer(app.get(MISSING_ORDER), &token)
            .send()
            .await
            .expect("Failed to send get order request");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["status"], 404);
    }
}

#[tokio::test]
async fn find_by_id_is_unauthorized_with_invalid_token() {
    let app = spawn_app().await;
    let token = forged(&app.admin_token().await);

    let response = bearer(app.get(EXISTING_ORDER), &token)
        .send()
        .await
        .expect("Failed to send get order request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn find_by_id_is_unauthorized_without_token() {
    let app = spawn_app().await;

    let response = app
        .get(EXISTING_ORDER)
        .send()
        .await
        .expect("Failed to send get order request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn client_places_order_and_reads_it_back() {
    let app = spawn_app().await;
    let token = app.client_token().await;

    let response = bearer(app.post("/orders"), &token)
        .json(&json!({
            "items": [
                { "productId": 3, "quantity": 1 },
                { "productId": 1, "quantity": 2 },
                { "productId": 1, "quantity": 1 }
            ]
        }))
        .send()
        .await
        .expect("Failed to send create order request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("Location header missing");
    let body = json_body(response).await;
    assert_eq!(body["id"], 4);
    assert_eq!(location, "/orders/4");
    assert_eq!(body["status"], "WAITING_PAYMENT");
    assert_eq!(body["client"]["name"], "Maria Brown");
    assert!(body["payment"].is_null());
    assert_eq!(body["items"][0]["productId"], 1);
    assert_eq!(body["items"][0]["quantity"], 3);
    assert_eq!(body["total"].as_f64(), Some(3.0 * 90.5 + 1250.0));

    let response = bearer(app.get(&location), &token)
        .send()
        .await
        .expect("Failed to send get order request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn placing_order_validates_items() {
    let app = spawn_app().await;
    let token = app.client_token().await;

    let response = bearer(app.post("/orders"), &token)
        .json(&json!({ "items": [] }))
        .send()
        .await
        .expect("Failed to send create order request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = bearer(app.post("/orders"), &token)
        .json(&json!({ "items": [{ "productId": 1, "quantity": 0 }] }))
        .send()
        .await
        .expect("Failed to send create order request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["errors"][0]["fieldName"], "items[0].quantity");
}

#[tokio::test]
async fn placing_order_with_unknown_product_is_not_found() {
    let app = spawn_app().await;
    let token = app.client_token().await;

    let response = bearer(app.post("/orders"), &token)
        .json(&json!({ "items": [{ "productId": 100, "quantity": 1 }] }))
        .send()
        .await
        .expect("Failed to send create order request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
