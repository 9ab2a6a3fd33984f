use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: String,
    pub birth_date: Date,
    pub password: String,
}

impl Model {
    /// `Ok(false)` on a mismatch, `Err` only when the stored hash is unreadable.
    pub fn check_hash(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(&self.password)?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRole,
    #[sea_orm(has_many = "super::order::Entity")]
    Order,
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRole.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(
    enum_name = "role_enum",
    db_type = "String(StringLen::N(32))",
    rs_type = "String"
)]
pub enum Role {
    #[sea_orm(string_value = "ROLE_CLIENT")]
    #[serde(rename = "ROLE_CLIENT")]
    Client,
    #[sea_orm(string_value = "ROLE_ADMIN")]
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn authority(&self) -> &'static str {
        match self {
            Role::Client => "ROLE_CLIENT",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trips_and_rejects_wrong_password() {
        let hash = hash_password("123456").expect("hashing failed");
        let user = Model {
            id: 1,
            name: "Maria Brown".into(),
            email: "maria@gmail.com".into(),
            phone: "988888888".into(),
            birth_date: Date::from_ymd_opt(2001, 7, 25).unwrap(),
            password: hash,
        };

        assert_eq!(user.check_hash("123456"), Ok(true));
        assert_eq!(user.check_hash("654321"), Ok(false));
    }
}
