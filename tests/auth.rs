mod common;

use common::{bearer, forged, json_body, spawn_app, ADMIN_USERNAME, CLIENT_USERNAME, PASSWORD};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn login_returns_bearer_token() {
    let app = spawn_app().await;

    let response = app.login(CLIENT_USERNAME, PASSWORD).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = spawn_app().await;

    let response = app.login(CLIENT_USERNAME, "654321").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.login("nobody@gmail.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn login_requires_both_fields() {
    let app = spawn_app().await;

    let response = app
        .post("/login")
        .json(&json!({ "username": "", "password": "" }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["errors"][0]["fieldName"], "password");
    assert_eq!(body["errors"][1]["fieldName"], "username");
}

#[tokio::test]
async fn profile_lists_every_role() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = bearer(app.get("/users/me"), &token)
        .send()
        .await
        .expect("Failed to send profile request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], 2);
    assert_eq!(body["name"], "Alex Green");
    assert_eq!(body["email"], ADMIN_USERNAME);
    assert!(body.get("password").is_none());
    let roles = body["roles"].as_array().expect("roles should be an array");
    assert!(roles.contains(&json!("ROLE_CLIENT")));
    assert!(roles.contains(&json!("ROLE_ADMIN")));
}

#[tokio::test]
async fn profile_requires_valid_token() {
    let app = spawn_app().await;

    let response = app
        .get("/users/me")
        .send()
        .await
        .expect("Failed to send profile request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = forged(&app.client_token().await);
    let response = bearer(app.get("/users/me"), &token)
        .send()
        .await
        .expect("Failed to send profile request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
