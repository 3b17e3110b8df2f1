//! Error responses shared by every handler
//!
//! Handlers return `Result<_, (StatusCode, Json<ErrorResponse>)>`; the
//! helpers here build that tuple for the common cases.

use std::collections::BTreeMap;

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use catalog_auth::PasswordError;
use catalog_db::CatalogError;
use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::media::MediaError;

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Field-level validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: Some(code.to_string()),
            fields: None,
        }),
    )
}

pub fn bad_request(code: &str, message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, code, message)
}

pub fn unauthorized(code: &str, message: impl Into<String>) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, code, message)
}

pub fn forbidden(code: &str, message: impl Into<String>) -> ApiError {
    api_error(StatusCode::FORBIDDEN, code, message)
}

/// Things a lookup can fail to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Category,
    Product,
    Brand,
    Tag,
    TagName,
    Feature,
    FeatureValue,
    News,
    Image,
    Message,
    User,
    Page,
}

impl Missing {
    pub fn code(self) -> &'static str {
        match self {
            Missing::Category => "CATEGORY_NOT_FOUND",
            Missing::Product => "PRODUCT_NOT_FOUND",
            Missing::Brand => "BRAND_NOT_FOUND",
            Missing::Tag => "TAG_NOT_FOUND",
            Missing::TagName => "TAG_NAME_NOT_FOUND",
            Missing::Feature => "FEATURE_NOT_FOUND",
            Missing::FeatureValue => "FEATURE_VALUE_NOT_FOUND",
            Missing::News => "NEWS_NOT_FOUND",
            Missing::Image => "IMAGE_NOT_FOUND",
            Missing::Message => "MESSAGE_NOT_FOUND",
            Missing::User => "USER_NOT_FOUND",
            Missing::Page => "INVALID_PAGE",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Missing::Category => "Категория не найдена",
            Missing::Product => "Товар не найден",
            Missing::Brand => "Бренд не найден",
            Missing::Tag => "Тег не найден",
            Missing::TagName => "Группа тегов не найдена",
            Missing::Feature => "Характеристика не найдена",
            Missing::FeatureValue => "Значение характеристики не найдено",
            Missing::News => "Новость не найдена",
            Missing::Image => "Изображение не найдено",
            Missing::Message => "Сообщение не найдено",
            Missing::User => "Пользователь не найден",
            Missing::Page => "Неправильная страница",
        }
    }
}

pub fn not_found(what: Missing) -> ApiError {
    api_error(StatusCode::NOT_FOUND, what.code(), what.message())
}

/// Map a database error onto a response.
///
/// Constraint violations are client errors; anything else is logged and
/// reported as a 500.
pub fn db_error(err: DbErr) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            warn!("Unique constraint violation: {}", msg);
            bad_request(
                "UNIQUE_VIOLATION",
                format!("A record with this value already exists ({})", msg),
            )
        }
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            warn!("Foreign key violation: {}", msg);
            bad_request(
                "INVALID_REFERENCE",
                "The referenced record does not exist or is still in use",
            )
        }
        _ => {
            error!("Database error: {}", err);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                format!("Database error: {}", err),
            )
        }
    }
}

pub fn catalog_error(err: CatalogError) -> ApiError {
    match err {
        CatalogError::Database(e) => db_error(e),
        CatalogError::SkuExhausted { .. } => {
            error!("{}", err);
            api_error(StatusCode::CONFLICT, "INTEGRITY_ERROR", err.to_string())
        }
        CatalogError::SingletonExists(_) => {
            api_error(StatusCode::CONFLICT, "SINGLETON_EXISTS", err.to_string())
        }
        CatalogError::Scope { field, message } => {
            let mut fields = FieldErrors::new();
            fields.add(field, message);
            fields.into_error()
        }
    }
}

pub fn password_error(err: PasswordError) -> ApiError {
    match err {
        PasswordError::TooWeak(problems) => {
            let mut fields = FieldErrors::new();
            for problem in problems {
                fields.add("new_password", problem);
            }
            fields.into_error()
        }
        other => {
            error!("Password hashing error: {}", other);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PASSWORD_ERROR",
                other.to_string(),
            )
        }
    }
}

/// Malformed uploads are the client's fault; failed writes are ours
pub fn media_error(err: MediaError) -> ApiError {
    match err {
        MediaError::Multipart(e) => bad_request("INVALID_UPLOAD", e.body_text()),
        MediaError::Io(e) => {
            error!("Media storage error: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "MEDIA_ERROR",
                "Failed to store the uploaded file",
            )
        }
    }
}

/// Turn a rejected JSON body into a 400
pub fn json_rejection(rejection: JsonRejection) -> ApiError {
    bad_request("INVALID_BODY", rejection.body_text())
}

/// Accumulates field-level validation messages
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record an error unless `value` is present and not blank
    pub fn require(&mut self, field: &str, value: Option<&str>) {
        match value {
            None => self.add(field, REQUIRED),
            Some(v) if v.trim().is_empty() => self.add(field, BLANK),
            Some(_) => {}
        }
    }

    /// Record an error if `value` is present but blank
    pub fn not_blank(&mut self, field: &str, value: Option<&str>) {
        if value.is_some_and(|v| v.trim().is_empty()) {
            self.add(field, BLANK);
        }
    }

    /// Record an error if `value` is longer than `max` characters
    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.add(
                field,
                format!("Ensure this field has no more than {} characters.", max),
            );
        }
    }

    /// Record an error if `value` is present, not blank and not an email address
    pub fn email(&mut self, field: &str, value: Option<&str>) {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return;
        };
        let valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !value.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            self.add(field, "Enter a valid email address.");
        }
    }

    /// Record a dangling reference
    pub fn missing_ref(&mut self, field: &str, id: i32) {
        self.add(
            field,
            format!("Invalid pk \"{}\" - object does not exist.", id),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_error(self) -> ApiError {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Validation failed".to_string(),
                code: Some("VALIDATION_ERROR".to_string()),
                fields: Some(self.fields),
            }),
        )
    }

    pub fn into_result(self) -> ApiResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors() {
        let mut errors = FieldErrors::new();
        errors.require("name", None);
        errors.require("email", Some("   "));
        errors.require("message", Some("hello"));

        let (status, Json(body)) = errors.into_result().unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = body.fields.unwrap();
        assert_eq!(fields["name"], vec![REQUIRED]);
        assert_eq!(fields["email"], vec![BLANK]);
        assert!(!fields.contains_key("message"));
    }

    #[test]
    fn test_email_check() {
        let mut errors = FieldErrors::new();
        errors.email("a", Some("user@example.com"));
        errors.email("b", Some(""));
        errors.email("c", Some("user@localhost"));
        errors.email("d", Some("no-at-sign.com"));
        errors.email("e", Some("two@@example.com"));

        let (_, Json(body)) = errors.into_error();
        let fields = body.fields.unwrap();
        assert!(!fields.contains_key("a"));
        assert!(!fields.contains_key("b"));
        assert!(fields.contains_key("c"));
        assert!(fields.contains_key("d"));
        assert!(fields.contains_key("e"));
    }

    #[test]
    fn test_not_found_is_localized() {
        let (status, Json(body)) = not_found(Missing::Category);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Категория не найдена");
        assert_eq!(body.code.as_deref(), Some("CATEGORY_NOT_FOUND"));
    }

    #[test]
    fn test_sku_exhaustion_is_conflict() {
        let (status, Json(body)) = catalog_error(CatalogError::SkuExhausted {
            prefix: "DRI".to_string(),
            attempts: 10,
        });
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code.as_deref(), Some("INTEGRITY_ERROR"));
    }
}
