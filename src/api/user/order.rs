use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use tracing::info;
use validator::Validate;

use crate::api::{
    dto::{OrderDto, OrderItemDto},
    error::ApiError,
    extract::ValidatedJson,
    public::product::product_not_found,
};
use crate::entities::{order, order_item, payment, product, user};
use crate::middleware::auth::AuthUser;

pub fn order_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/orders/:id", get(get_order))
        .layer(Extension(db))
}

pub fn client_order_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/orders", post(create_order))
        .layer(Extension(db))
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<OrderDto>, ApiError> {
    let txn = db.begin().await?;
    let order = order::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {} not found", id)))?;

    if !caller.is_admin() && order.client_id != caller.id {
        return Err(ApiError::Forbidden("Access denied".to_owned()));
    }

    let dto = load_order_dto(&txn, order).await?;
    txn.commit().await?;
    Ok(Json(dto))
}

async fn create_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<OrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    // repeated products collapse into one line
    let mut lines: BTreeMap<i32, i32> = BTreeMap::new();
    for item in &payload.items {
        let quantity = lines.entry(item.product_id).or_default();
        *quantity = quantity.saturating_add(item.quantity);
    }

    let txn = db.begin().await?;
    let products = product::Entity::find()
        .filter(product::Column::Id.is_in(lines.keys().copied()))
        .all(&txn)
        .await?;
    if let Some(missing) = lines
        .keys()
        .find(|id| !products.iter().any(|p| p.id == **id))
    {
        return Err(product_not_found(*missing));
    }

    let order = order::ActiveModel {
        moment: Set(Utc::now()),
        status: Set(order::Status::WaitingPayment),
        client_id: Set(caller.id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    order_item::Entity::insert_many(products.iter().map(|p| order_item::ActiveModel {
        order_id: Set(order.id),
        product_id: Set(p.id),
        quantity: Set(lines[&p.id]),
        price: Set(p.price),
    }))
    .exec_without_returning(&txn)
    .await?;

    let dto = load_order_dto(&txn, order).await?;
    txn.commit().await?;
    info!(order_id = dto.id, client_id = caller.id, total = dto.total, "Order placed");

    let location = format!("/orders/{}", dto.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(dto)))
}

async fn load_order_dto<C: ConnectionTrait>(
    conn: &C,
    order: order::Model,
) -> Result<OrderDto, ApiError> {
    let client = order
        .find_related(user::Entity)
        .one(conn)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Order {} has no client", order.id)))?;

    let payment = payment::Entity::find_by_id(order.id).one(conn).await?;

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .order_by_asc(order_item::Column::ProductId)
        .find_also_related(product::Entity)
        .all(conn)
        .await?
        .into_iter()
        .map(|(item, product)| match product {
            Some(product) => Ok(OrderItemDto::new(&item, product)),
            None => Err(ApiError::Internal(format!(
                "Order {} references missing product {}",
                item.order_id, item.product_id
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OrderDto::new(order, client, payment, items))
}

#[derive(Deserialize, Validate)]
struct OrderPayload {
    #[validate(length(min = 1, message = "Order must have at least one item"), nested)]
    items: Vec<OrderItemPayload>,
}

#[derive(Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
struct OrderItemPayload {
    product_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    quantity: i32,
}
