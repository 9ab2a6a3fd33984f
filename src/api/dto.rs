use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::entities::{
    category, order, order_item, payment, product,
    user::{self, Role},
};

pub fn format_instant(moment: &DateTime<Utc>) -> String {
    moment.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[derive(Serialize, Debug)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
}

impl From<category::Model> for CategoryDto {
    fn from(value: category::Model) -> Self {
        CategoryDto {
            id: value.id,
            name: value.name,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductMinDto {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub img_url: Option<String>,
}

impl From<product::Model> for ProductMinDto {
    fn from(value: product::Model) -> Self {
        ProductMinDto {
            id: value.id,
            name: value.name,
            price: value.price,
            img_url: value.img_url,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub img_url: Option<String>,
    pub categories: Vec<CategoryDto>,
}

impl ProductDto {
    pub fn new(value: product::Model, categories: Vec<category::Model>) -> Self {
        ProductDto {
            id: value.id,
            name: value.name,
            description: value.description,
            price: value.price,
            img_url: value.img_url,
            categories: categories.into_iter().map(CategoryDto::from).collect(),
        }
    }
}

/// Paged listing envelope.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
    pub size: u64,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, number: u64, size: u64, total_elements: u64) -> Self {
        let total_pages = total_elements.div_ceil(size.max(1));
        Page {
            number_of_elements: content.len(),
            empty: content.is_empty(),
            first: number == 0,
            last: number.saturating_add(1) >= total_pages,
            content,
            total_elements,
            total_pages,
            number,
            size,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ClientDto {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, Debug)]
pub struct PaymentDto {
    pub id: i32,
    pub moment: String,
}

impl From<payment::Model> for PaymentDto {
    fn from(value: payment::Model) -> Self {
        PaymentDto {
            id: value.order_id,
            moment: format_instant(&value.moment),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub product_id: i32,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub img_url: Option<String>,
    pub sub_total: f64,
}

impl OrderItemDto {
    pub fn new(item: &order_item::Model, product: product::Model) -> Self {
        OrderItemDto {
            product_id: item.product_id,
            name: product.name,
            price: item.price,
            quantity: item.quantity,
            img_url: product.img_url,
            sub_total: item.sub_total(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct OrderDto {
    pub id: i32,
    pub moment: String,
    pub status: order::Status,
    pub client: ClientDto,
    pub payment: Option<PaymentDto>,
    pub items: Vec<OrderItemDto>,
    pub total: f64,
}

impl OrderDto {
    pub fn new(
        order: order::Model,
        client: user::Model,
        payment: Option<payment::Model>,
        items: Vec<OrderItemDto>,
    ) -> Self {
        OrderDto {
            id: order.id,
            moment: format_instant(&order.moment),
            status: order.status,
            client: ClientDto {
                id: client.id,
                name: client.name,
            },
            payment: payment.map(PaymentDto::from),
            total: items.iter().map(|item| item.sub_total).sum(),
            items,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub roles: Vec<Role>,
}

impl UserDto {
    pub fn new(user: user::Model, roles: Vec<Role>) -> Self {
        UserDto {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            birth_date: user.birth_date,
            roles,
        }
    }
}
