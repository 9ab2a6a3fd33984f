use axum::{extract::Extension, routing::post, Json, Router};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::api::{error::ApiError, extract::ValidatedJson};
use crate::entities::user;
use crate::middleware::auth::{roles_of, JwtKeys};

pub fn auth_router(db: Arc<DatabaseConnection>, keys: Arc<JwtKeys>) -> Router {
    Router::new()
        .route("/login", post(login))
        .layer(Extension(db))
        .layer(Extension(keys))
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(keys): Extension<Arc<JwtKeys>>,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(payload.username.trim()))
        .one(&*db)
        .await?
        .ok_or_else(invalid_credentials)?;

    // argon2 is CPU bound, keep it off the async workers
    let candidate = user.clone();
    let verified = tokio::task::spawn_blocking(move || candidate.check_hash(&payload.password))
        .await
        .map_err(|err| ApiError::Internal(format!("Password check aborted: {}", err)))?
        .map_err(|err| ApiError::Internal(format!("Unreadable password hash: {}", err)))?;

    if !verified {
        return Err(invalid_credentials());
    }

    let roles = roles_of(&*db, user.id).await?;
    let token = keys
        .generate_token(user.id, &user.email, &roles)
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    info!(user_id = user.id, "User logged in");
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "Bearer",
        expires_in: keys.ttl_seconds(),
    }))
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_owned())
}

#[derive(Deserialize, Validate)]
struct LoginPayload {
    #[validate(length(min = 1, message = "Username is required"))]
    username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: &'static str,
    expires_in: i64,
}
