pub mod order;
pub mod profile;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState, JwtKeys};
use order::{client_order_router, order_router};
use profile::profile_router;

/// Routes open to any authenticated user, plus order placement for clients.
pub fn user_api_router(db: Arc<DatabaseConnection>, keys: Arc<JwtKeys>) -> Router {
    let any_user = AuthState {
        db: db.clone(),
        keys,
        role: None,
    };
    let client = AuthState {
        role: Some(Role::Client),
        ..any_user.clone()
    };

    let authenticated = Router::new()
        .merge(order_router(db.clone()))
        .merge(profile_router(db.clone()))
        .route_layer(from_fn_with_state(any_user, auth_middleware));

    let client_only = client_order_router(db)
        .route_layer(from_fn_with_state(client, auth_middleware));

    authenticated.merge(client_only)
}
