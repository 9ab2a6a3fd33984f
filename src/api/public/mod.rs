pub mod auth;
pub mod category;
pub mod product;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::middleware::auth::JwtKeys;
use auth::auth_router;
use category::category_router;
use product::product_router;

pub fn public_api_router(db: Arc<DatabaseConnection>, keys: Arc<JwtKeys>) -> Router {
    Router::new()
        .merge(auth_router(db.clone(), keys))
        .merge(category_router(db.clone()))
        .merge(product_router(db))
}
