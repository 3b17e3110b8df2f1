//! HTTP handlers
//!
//! Public catalog endpoints live in the top-level modules; everything under
//! `/api/admin` is in [`admin`].

pub mod admin;
pub mod brands;
pub mod categories;
pub mod content;
pub mod news;
pub mod products;
pub mod system;
pub mod tags;
pub mod vocabulary;

use axum::{extract::rejection::JsonRejection, Json};

use crate::error::{json_rejection, ApiResult};

/// Unwrap a JSON body, turning extractor rejections into 400s
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(value)| value).map_err(json_rejection)
}

/// Trimmed, non-blank string
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
