use axum::{
    extract::{Extension, Path, Query},
    routing::get,
    Json, Router,
};
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::{
    dto::{Page, ProductDto, ProductMinDto},
    error::ApiError,
};
use crate::entities::{category, product};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

pub fn product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/products", get(get_products))
        .route("/products/:id", get(get_product))
        .layer(Extension(db))
}

async fn get_products(
    Query(params): Query<GetProductsQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Json<Page<ProductMinDto>>, ApiError> {
    let (sort_column, order) = parse_sort(params.sort.as_deref())?;
    let page = params.page.unwrap_or(0);
    let size = params
        .size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    check_offset(page, size)?;

    let mut query = product::Entity::find();

    if let Some(name) = params.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        let pattern = format!("%{}%", escape_like(&name.to_lowercase()));
        query = query.filter(
            Expr::expr(Func::lower(Expr::col((
                product::Entity,
                product::Column::Name,
            ))))
            .like(LikeExpr::new(pattern).escape('\\')),
        );
    }

    // id breaks ties so pages never overlap
    let paginator = query
        .order_by(sort_column, order)
        .order_by_asc(product::Column::Id)
        .paginate(&*db, size);

    let total = paginator.num_items().await?;
    let products = paginator.fetch_page(page).await?;

    Ok(Json(Page::new(
        products.into_iter().map(ProductMinDto::from).collect(),
        page,
        size,
        total,
    )))
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Result<Json<ProductDto>, ApiError> {
    let product = product::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_else(|| product_not_found(id))?;

    Ok(Json(load_product_dto(&*db, product).await?))
}

pub async fn load_product_dto<C: ConnectionTrait>(
    conn: &C,
    product: product::Model,
) -> Result<ProductDto, DbErr> {
    let categories = product
        .find_related(category::Entity)
        .order_by_asc(category::Column::Id)
        .all(conn)
        .await?;

    Ok(ProductDto::new(product, categories))
}

pub fn product_not_found(id: i32) -> ApiError {
    ApiError::NotFound(format!("Product {} not found", id))
}

/// The row offset must fit the database's signed 64-bit OFFSET.
fn check_offset(page: u64, size: u64) -> Result<(), ApiError> {
    match page.checked_mul(size) {
        Some(offset) if i64::try_from(offset).is_ok() => Ok(()),
        _ => Err(ApiError::BadRequest(format!(
            "Page {} is out of range",
            page
        ))),
    }
}

/// Makes `%`, `_` and `\` match literally under `ESCAPE '\'`.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Accepts `property` or `property,direction`; defaults to `id,asc`.
fn parse_sort(sort: Option<&str>) -> Result<(product::Column, Order), ApiError> {
    let Some(sort) = sort.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok((product::Column::Id, Order::Asc));
    };

    let (property, direction) = match sort.split_once(',') {
        Some((property, direction)) => (property.trim(), Some(direction.trim())),
        None => (sort, None),
    };

    let column = match property {
        "id" => product::Column::Id,
        "name" => product::Column::Name,
        "price" => product::Column::Price,
        other => {
            return Err(ApiError::BadRequest(format!(
                "Cannot sort products by '{}'",
                other
            )))
        }
    };

    let order = match direction.map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("asc") => Order::Asc,
        Some("desc") => Order::Desc,
        Some(other) => {
            return Err(ApiError::BadRequest(format!(
                "Unknown sort direction '{}'",
                other
            )))
        }
    };

    Ok((column, order))
}

#[derive(Deserialize)]
struct GetProductsQuery {
    name: Option<String>,
    page: Option<u64>,
    size: Option<u64>,
    sort: Option<String>,
}
