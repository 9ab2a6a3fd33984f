pub mod api;
pub mod config;
pub mod entities;
pub mod middleware;

use axum::Router;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::{sync::Arc, time::Duration};
use tracing::info;

use crate::api::create_api_router;
use crate::config::{is_memory_url, Config};
use crate::entities::{fixtures::seed_fixtures, setup_schema};
use crate::middleware::auth::JwtKeys;

/// Idle and lifetime limit for the in-memory connection. Finite, since the pool adds it to
/// `Instant::now()`.
const MEMORY_CONNECTION_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

pub fn connect_options(config: &Config) -> ConnectOptions {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options.sqlx_logging(false);
    if is_memory_url(&config.database_url) {
        // the database lives as long as its single connection
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(MEMORY_CONNECTION_LIFETIME)
            .max_lifetime(MEMORY_CONNECTION_LIFETIME);
    } else {
        options.max_connections(config.max_connections);
    }
    options
}

pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    Database::connect(connect_options(config)).await
}

/// Connects, prepares the schema and optional fixtures, and returns the full router.
pub async fn build_app(config: Config) -> Result<Router, DbErr> {
    let db = connect(&config).await?;
    setup_schema(&db).await?;
    if config.seed_fixtures {
        seed_fixtures(&db).await?;
    }
    info!(database = %config.database_url, "Database ready");

    let keys = Arc::new(JwtKeys::new(&config.jwt_secret, config.token_ttl_hours));
    Ok(create_api_router(Arc::new(db), keys))
}
