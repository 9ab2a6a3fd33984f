use axum::{extract::Extension, routing::get, Json, Router};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::sync::Arc;

use crate::api::{dto::UserDto, error::ApiError};
use crate::entities::user;
use crate::middleware::auth::AuthUser;

pub fn profile_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/users/me", get(get_me))
        .layer(Extension(db))
}

async fn get_me(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<UserDto>, ApiError> {
    let user = user::Entity::find_by_id(caller.id)
        .one(&*db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", caller.id)))?;

    Ok(Json(UserDto::new(user, caller.roles)))
}
