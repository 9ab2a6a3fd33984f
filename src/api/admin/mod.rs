pub mod product;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use product::admin_product_router;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState, JwtKeys};

pub fn admin_api_router(db: Arc<DatabaseConnection>, keys: Arc<JwtKeys>) -> Router {
    Router::new()
        .merge(admin_product_router(db.clone()))
        .route_layer(from_fn_with_state(
            AuthState {
                db,
                keys,
                role: Some(Role::Admin),
            },
            auth_middleware,
        ))
}
