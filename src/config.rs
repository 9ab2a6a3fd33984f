use std::{net::SocketAddr, str::FromStr};

use dotenvy::dotenv;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub max_connections: u32,
    pub seed_fixtures: bool,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://commerce.db?mode=rwc".to_owned());
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => return Err(ConfigError::Missing("JWT_SECRET")),
        };
        let default_connections = if is_memory_url(&database_url) { 1 } else { 5 };

        Ok(Config {
            bind_addr: parse_var("BIND_ADDR", "0.0.0.0:3000".parse().ok())?,
            token_ttl_hours: parse_var("TOKEN_TTL_HOURS", Some(24))?,
            max_connections: parse_var("DB_MAX_CONNECTIONS", Some(default_connections))?,
            seed_fixtures: parse_var("SEED_FIXTURES", Some(true))?,
            database_url,
            jwt_secret,
        })
    }
}

/// Every connection to `sqlite::memory:` opens its own empty database.
pub fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn parse_var<T: FromStr>(name: &'static str, default: Option<T>) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => default.ok_or(ConfigError::Missing(name)),
    }
}
