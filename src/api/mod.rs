pub mod admin;
pub mod dto;
pub mod error;
pub mod extract;
pub mod public;
pub mod user;

use axum::{middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::JwtKeys, logging::logging_middleware};
use admin::admin_api_router;
use public::public_api_router;
use user::user_api_router;

pub fn create_api_router(shared_db: Arc<DatabaseConnection>, keys: Arc<JwtKeys>) -> Router {
    Router::new()
        .merge(public_api_router(shared_db.clone(), keys.clone()))
        .merge(user_api_router(shared_db.clone(), keys.clone()))
        .merge(admin_api_router(shared_db, keys))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
