use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::api::error::ApiError;
use crate::entities::{
    user::{self, Role},
    user_role,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub username: String,
    pub authorities: Vec<String>,
    pub iat: usize,
    pub exp: usize,
}

/// The authenticated caller, inserted into request extensions by [`auth_middleware`].
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub roles: Vec<Role>,
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Token expired or invalid")]
    InvalidToken,
    #[error("Failed to generate token")]
    GenerationFail,
}

pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn generate_token(
        &self,
        user_id: i32,
        username: &str,
        roles: &[Role],
    ) -> Result<String, AuthMiddlewareError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or(AuthMiddlewareError::GenerationFail)?;

        let claims = Claims {
            sub: user_id,
            username: username.to_owned(),
            authorities: roles.iter().map(|role| role.authority().to_owned()).collect(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| AuthMiddlewareError::GenerationFail)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthMiddlewareError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                debug!(error = %err, "Rejected bearer token");
                AuthMiddlewareError::InvalidToken
            })
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub keys: Arc<JwtKeys>,
    /// `None` admits any authenticated user.
    pub role: Option<Role>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_owned()))?;

    let claims = state
        .keys
        .validate_token(token)
        .map_err(|err| ApiError::Unauthorized(err.to_string()))?;

    let user = load_auth_user(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unknown user".to_owned()))?;

    if let Some(required) = state.role {
        if !user.has_role(required) {
            return Err(ApiError::Forbidden("Access denied".to_owned()));
        }
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Roles come from the database, not the token, so revocations apply immediately.
pub async fn load_auth_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<AuthUser>, ApiError> {
    let Some(user) = user::Entity::find_by_id(user_id).one(db).await? else {
        return Ok(None);
    };

    Ok(Some(AuthUser {
        roles: roles_of(db, user.id).await?,
        id: user.id,
        username: user.email,
    }))
}

pub async fn roles_of<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<Role>, DbErr> {
    Ok(user_role::Entity::find()
        .filter(user_role::Column::UserId.eq(user_id))
        .order_by_asc(user_role::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|entry| entry.role)
        .collect())
}
