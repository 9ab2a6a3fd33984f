use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{post, put},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::api::{
    dto::ProductDto,
    error::{ApiError, FieldMessage},
    extract::ValidatedJson,
    public::product::product_not_found,
};
use crate::entities::{category, order_item, product, product_category};

pub fn admin_product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id", put(update_product).delete(delete_product))
        .layer(Extension(db))
}

async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let txn = db.begin().await?;
    let categories = resolve_categories(&txn, &payload.categories).await?;

    let product = product::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        img_url: Set(payload.img_url),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    link_categories(&txn, product.id, &categories).await?;

    txn.commit().await?;
    info!(product_id = product.id, "Product created");

    let location = format!("/products/{}", product.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ProductDto::new(product, categories)),
    ))
}

async fn update_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> Result<Json<ProductDto>, ApiError> {
    let txn = db.begin().await?;
    let existing = product::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    let categories = resolve_categories(&txn, &payload.categories).await?;

    let mut product: product::ActiveModel = existing.into();
    product.name = Set(payload.name);
    product.description = Set(payload.description);
    product.price = Set(payload.price);
    product.img_url = Set(payload.img_url);
    let product = product.update(&txn).await?;

    product_category::Entity::delete_many()
        .filter(product_category::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;
    link_categories(&txn, id, &categories).await?;

    txn.commit().await?;
    info!(product_id = id, "Product updated");
    Ok(Json(ProductDto::new(product, categories)))
}

async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<StatusCode, ApiError> {
    let txn = db.begin().await?;

    if product::Entity::find_by_id(id).one(&txn).await?.is_none() {
        return Err(product_not_found(id));
    }

    let references = order_item::Entity::find()
        .filter(order_item::Column::ProductId.eq(id))
        .count(&txn)
        .await?;
    if references > 0 {
        return Err(ApiError::Integrity(format!(
            "Product {} is referenced by {} order item(s)",
            id, references
        )));
    }

    product_category::Entity::delete_many()
        .filter(product_category::Column::ProductId.eq(id))
        .exec(&txn)
        .await?;
    product::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    info!(product_id = id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Loads the referenced categories, failing validation if any id is unknown.
async fn resolve_categories<C: ConnectionTrait>(
    conn: &C,
    refs: &[CategoryRef],
) -> Result<Vec<category::Model>, ApiError> {
    let mut ids: Vec<i32> = refs.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    ids.dedup();

    let found = category::Entity::find()
        .filter(category::Column::Id.is_in(ids.clone()))
        .order_by_asc(category::Column::Id)
        .all(conn)
        .await?;

    let missing: Vec<FieldMessage> = ids
        .iter()
        .filter(|id| !found.iter().any(|c| c.id == **id))
        .map(|id| FieldMessage::new("categories", format!("Category {} does not exist", id)))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::Validation(missing));
    }

    Ok(found)
}

async fn link_categories<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    categories: &[category::Model],
) -> Result<(), ApiError> {
    product_category::Entity::insert_many(categories.iter().map(|c| {
        product_category::ActiveModel {
            product_id: Set(product_id),
            category_id: Set(c.id),
        }
    }))
    .exec_without_returning(conn)
    .await?;
    Ok(())
}

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
struct ProductPayload {
    #[validate(length(min = 3, max = 80, message = "Name must have between 3 and 80 characters"))]
    name: String,
    #[validate(length(min = 10, message = "Description must have at least 10 characters"))]
    description: String,
    #[validate(range(exclusive_min = 0.0, message = "Price must be positive"))]
    price: f64,
    #[validate(url(message = "Image URL must be a valid URL"))]
    img_url: Option<String>,
    #[validate(length(min = 1, message = "Product must have at least one category"))]
    categories: Vec<CategoryRef>,
}

#[derive(Deserialize, Serialize, Debug)]
struct CategoryRef {
    id: i32,
}
