pub mod category;
pub mod fixtures;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod product;
pub mod product_category;
pub mod user;
pub mod user_role;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};
use tracing::debug;

/// Creates every table that does not exist yet. Parents come before children so
/// foreign keys resolve on backends that check them at creation time.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, user::Entity).await?;
    create_table(db, user_role::Entity).await?;
    create_table(db, category::Entity).await?;
    create_table(db, product::Entity).await?;
    create_table(db, product_category::Entity).await?;
    create_table(db, order::Entity).await?;
    create_table(db, order_item::Entity).await?;
    create_table(db, payment::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let table = entity.table_name().to_owned();
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(backend.build(&statement)).await?;
    debug!(%table, "Table ready");
    Ok(())
}
