use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::middleware::logging::ErrorReport;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid data")]
    Validation(Vec<FieldMessage>),
    #[error("Referential integrity violation: {0}")]
    Integrity(String),
    #[error("Database error: {0}")]
    Database(DbErr),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldMessage {
    pub field_name: String,
    pub message: String,
}

impl FieldMessage {
    pub fn new(field_name: impl Into<String>, message: impl Into<String>) -> Self {
        FieldMessage {
            field_name: field_name.into(),
            message: message.into(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Integrity(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Database(_) | ApiError::Internal(_) => "Internal server error".to_owned(),
            ApiError::Integrity(_) => "Referential integrity violation".to_owned(),
            other => other.to_string(),
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => ApiError::Integrity(detail),
            _ => ApiError::Database(err),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        flatten_errors(&errors, "", &mut messages);
        messages.sort_by(|a, b| a.field_name.cmp(&b.field_name));
        ApiError::Validation(messages)
    }
}

fn flatten_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldMessage>) {
    for (field, kind) in errors.errors() {
        let field = camel_case(field);
        let path = if prefix.is_empty() {
            field
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    FieldMessage::new(path.clone(), message)
                }));
            }
            ValidationErrorsKind::Struct(nested) => flatten_errors(nested, &path, out),
            ValidationErrorsKind::List(entries) => {
                for (index, nested) in entries {
                    flatten_errors(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

/// Field names follow the JSON bodies, not the Rust structs.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "status": status.as_u16(),
            "error": self.public_message(),
        });
        if let ApiError::Validation(errors) = &self {
            body["errors"] = json!(errors);
        }

        let mut response = (status, Json(body)).into_response();
        response
            .extensions_mut()
            .insert(ErrorReport(self.to_string()));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    struct Line {
        #[validate(range(min = 1, message = "Quantity must be at least 1"))]
        quantity: i32,
    }

    #[derive(Deserialize, Validate)]
    struct Basket {
        #[validate(length(min = 3, message = "Name too short"))]
        name: String,
        #[validate(nested)]
        lines: Vec<Line>,
    }

    #[test]
    fn validation_errors_flatten_with_indexed_paths() {
        let basket = Basket {
            name: "ab".into(),
            lines: vec![Line { quantity: 2 }, Line { quantity: 0 }],
        };
        let errors = basket.validate().unwrap_err();

        let ApiError::Validation(messages) = ApiError::from(errors) else {
            panic!("expected a validation error");
        };
        assert_eq!(
            messages,
            vec![
                FieldMessage::new("lines[1].quantity", "Quantity must be at least 1"),
                FieldMessage::new("name", "Name too short"),
            ]
        );
    }

    #[test]
    fn field_names_are_camel_cased() {
        assert_eq!(camel_case("img_url"), "imgUrl");
        assert_eq!(camel_case("name"), "name");
    }

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Integrity("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Validation(vec![]).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Database(DbErr::Custom("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn foreign_key_violation_from_database_is_bad_request() {
        use crate::config::Config;
        use crate::entities::{fixtures::seed_fixtures, product, setup_schema};
        use sea_orm::EntityTrait;

        let config = Config {
            database_url: "sqlite::memory:".to_owned(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            jwt_secret: "secret".to_owned(),
            token_ttl_hours: 1,
            max_connections: 1,
            seed_fixtures: true,
        };
        let db = crate::connect(&config).await.unwrap();
        setup_schema(&db).await.unwrap();
        seed_fixtures(&db).await.unwrap();

        // product 3 is still referenced by order items
        let err = product::Entity::delete_by_id(3).exec(&db).await.unwrap_err();
        let api_error = ApiError::from(err);

        assert!(matches!(api_error, ApiError::Integrity(_)), "{:?}", api_error);
        assert_eq!(api_error.status(), StatusCode::BAD_REQUEST);
        assert!(product::Entity::find_by_id(3).one(&db).await.unwrap().is_some());
    }

    #[test]
    fn error_response_carries_report_for_logging() {
        let response = ApiError::NotFound("Order 100 not found".into()).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.extensions().get::<ErrorReport>().map(|r| r.0.as_str()),
            Some("Order 100 not found")
        );
    }
}
