//! Reference data loaded into an empty database.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{
    category, order, order_item, payment, product, product_category,
    user::{self, Role},
    user_role,
};

const FIXTURE_PASSWORD: &str = "123456";

const DESCRIPTION: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud \
exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.";

const IMG_BASE: &str =
    "https://raw.githubusercontent.com/devsuperior/dscatalog-resources/master/backend/img";

// (id, name, price, category)
const PRODUCTS: [(i32, &str, f64, i32); 25] = [
    (1, "The Lord of the Rings", 90.5, 1),
    (2, "Smart TV", 2190.0, 2),
    (3, "Macbook Pro", 1250.0, 3),
    (4, "PC Gamer", 1200.0, 3),
    (5, "Rails for Dummies", 100.99, 1),
    (6, "PC Gamer Ex", 1350.0, 3),
    (7, "PC Gamer X", 1350.0, 3),
    (8, "PC Gamer Alfa", 1850.0, 3),
    (9, "PC Gamer Tera", 1350.0, 3),
    (10, "PC Gamer Y", 1700.0, 3),
    (11, "PC Gamer Nitro", 1450.0, 3),
    (12, "PC Gamer Card", 1850.0, 3),
    (13, "PC Gamer Plus", 1350.0, 3),
    (14, "PC Gamer Hera", 2250.0, 3),
    (15, "PC Gamer Weed", 2200.0, 3),
    (16, "PC Gamer Max", 2340.0, 3),
    (17, "PC Gamer Turbo", 1280.0, 3),
    (18, "PC Gamer Hot", 1450.0, 3),
    (19, "PC Gamer Ez", 1750.0, 3),
    (20, "PC Gamer Tr", 1650.0, 3),
    (21, "PC Gamer Tx", 1680.0, 3),
    (22, "PC Gamer Er", 1850.0, 3),
    (23, "PC Gamer Min", 2250.0, 3),
    (24, "PC Gamer Boo", 2350.0, 3),
    (25, "PC Gamer Foo", 4170.0, 3),
];

/// Seeds users, catalog and orders unless the database already holds users.
pub async fn seed_fixtures(db: &DatabaseConnection) -> Result<(), DbErr> {
    if user::Entity::find().count(db).await? > 0 {
        info!("Database already populated, skipping fixtures");
        return Ok(());
    }

    // one hash for both accounts, they share the password
    let password_hash = user::hash_password(FIXTURE_PASSWORD)
        .map_err(|err| DbErr::Custom(format!("Failed to hash fixture password: {err}")))?;

    let txn = db.begin().await?;

    user::Entity::insert_many([
        user::ActiveModel {
            id: Set(1),
            name: Set("Maria Brown".to_owned()),
            email: Set("maria@gmail.com".to_owned()),
            phone: Set("988888888".to_owned()),
            birth_date: Set(date(2001, 7, 25)?),
            password: Set(password_hash.clone()),
        },
        user::ActiveModel {
            id: Set(2),
            name: Set("Alex Green".to_owned()),
            email: Set("alex@gmail.com".to_owned()),
            phone: Set("977777777".to_owned()),
            birth_date: Set(date(1987, 12, 13)?),
            password: Set(password_hash),
        },
    ])
    .exec_without_returning(&txn)
    .await?;

    user_role::Entity::insert_many(
        [(1, Role::Client), (2, Role::Client), (2, Role::Admin)].map(|(user_id, role)| {
            user_role::ActiveModel {
                user_id: Set(user_id),
                role: Set(role),
                ..Default::default()
            }
        }),
    )
    .exec_without_returning(&txn)
    .await?;

    category::Entity::insert_many(
        [(1, "Books"), (2, "Electronics"), (3, "Computers")].map(|(id, name)| {
            category::ActiveModel {
                id: Set(id),
                name: Set(name.to_owned()),
            }
        }),
    )
    .exec_without_returning(&txn)
    .await?;

    product::Entity::insert_many(PRODUCTS.iter().map(|&(id, name, price, _)| {
        product::ActiveModel {
            id: Set(id),
            name: Set(name.to_owned()),
            description: Set(DESCRIPTION.to_owned()),
            price: Set(price),
            img_url: Set(Some(format!("{IMG_BASE}/{id}-big.jpg"))),
        }
    }))
    .exec_without_returning(&txn)
    .await?;

    product_category::Entity::insert_many(PRODUCTS.iter().map(|&(id, _, _, category_id)| {
        product_category::ActiveModel {
            product_id: Set(id),
            category_id: Set(category_id),
        }
    }))
    .exec_without_returning(&txn)
    .await?;

    order::Entity::insert_many([
        (1, "2022-07-25T13:00:00Z", order::Status::Paid, 1),
        (2, "2022-07-29T15:50:00Z", order::Status::Delivered, 2),
        (3, "2022-08-03T14:20:00Z", order::Status::WaitingPayment, 1),
    ]
    .into_iter()
    .map(|(id, moment, status, client_id)| {
        Ok(order::ActiveModel {
            id: Set(id),
            moment: Set(instant(moment)?),
            status: Set(status),
            client_id: Set(client_id),
        })
    })
    .collect::<Result<Vec<_>, DbErr>>()?)
    .exec_without_returning(&txn)
    .await?;

    order_item::Entity::insert_many(
        [(1, 1, 2, 90.5), (1, 3, 1, 1250.0), (2, 3, 1, 1250.0), (3, 1, 1, 90.5)].map(
            |(order_id, product_id, quantity, price)| order_item::ActiveModel {
                order_id: Set(order_id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                price: Set(price),
            },
        ),
    )
    .exec_without_returning(&txn)
    .await?;

    payment::Entity::insert_many([
        payment::ActiveModel {
            order_id: Set(1),
            moment: Set(instant("2022-07-25T15:00:00Z")?),
        },
        payment::ActiveModel {
            order_id: Set(2),
            moment: Set(instant("2022-07-30T11:00:00Z")?),
        },
    ])
    .exec_without_returning(&txn)
    .await?;

    txn.commit().await?;
    info!(products = PRODUCTS.len(), "Fixtures seeded");
    Ok(())
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, DbErr> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DbErr::Custom(format!("Invalid fixture date {year}-{month}-{day}")))
}

fn instant(value: &str) -> Result<DateTime<Utc>, DbErr> {
    DateTime::parse_from_rfc3339(value)
        .map(|moment| moment.with_timezone(&Utc))
        .map_err(|err| DbErr::Custom(format!("Invalid fixture instant {value}: {err}")))
}
