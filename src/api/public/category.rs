use axum::{extract::Extension, routing::get, Json, Router};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use std::sync::Arc;

use crate::api::{dto::CategoryDto, error::ApiError};
use crate::entities::category;

pub fn category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .layer(Extension(db))
}

async fn get_categories(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Json<Vec<CategoryDto>>, ApiError> {
    let categories = category::Entity::find()
        .order_by_asc(category::Column::Id)
        .all(&*db)
        .await?;

    Ok(Json(categories.into_iter().map(CategoryDto::from).collect()))
}
