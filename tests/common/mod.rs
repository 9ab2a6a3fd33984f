#![allow(dead_code)]

use commerce_api::{build_app, config::Config};
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const ADMIN_USERNAME: &str = "alex@gmail.com";
pub const CLIENT_USERNAME: &str = "maria@gmail.com";
pub const PASSWORD: &str = "123456";

pub struct TestApp {
    pub address: String,
    pub client: Client,
}

/// Starts the full server on an ephemeral port over a fresh, seeded in-memory database.
pub async fn spawn_app() -> TestApp {
    let config = Config {
        database_url: "sqlite::memory:".to_owned(),
        bind_addr: "127.0.0.1:0".parse().expect("Invalid bind address"),
        jwt_secret: "integration-test-secret".to_owned(),
        token_ttl_hours: 1,
        max_connections: 1,
        seed_fixtures: true,
    };
    let app = build_app(config).await.expect("Failed to build app");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = format!(
        "http://{}",
        listener.local_addr().expect("Listener has no address")
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    let client = Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to build client");

    TestApp { address, client }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to send login request")
    }

    pub async fn token_for(&self, username: &str) -> String {
        let response = self.login(username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse login response JSON");
        body["access_token"]
            .as_str()
            .expect("Token not found in login response")
            .to_owned()
    }

    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_USERNAME).await
    }

    pub async fn client_token(&self) -> String {
        self.token_for(CLIENT_USERNAME).await
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }
}

/// A well-formed token whose signature no longer matches.
pub fn forged(token: &str) -> String {
    format!("{}xpto", token)
}

pub fn bearer(request: RequestBuilder, token: &str) -> RequestBuilder {
    request.header(header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn json_body(response: reqwest::Response) -> Value {
    response
        .json::<Value>()
        .await
        .expect("Failed to parse response JSON")
}
