use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use catalog_db::entities::{about_content, contact_info, contact_message};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use tracing::{debug, info};

use crate::error::{db_error, ApiResult, ErrorResponse, FieldErrors};
use crate::models::{
    AboutContentResponse, ContactInfoResponse, ContactMessageRequest, MessageResponse,
};
use crate::AppState;

use super::body;

const ABOUT_PLACEHOLDER_TITLE: &str = "О нас";
const ABOUT_PLACEHOLDER_CONTENT: &str = "Информация временно отсутствует";
const CONTACT_PLACEHOLDER_ADDRESS: &str = "Информация отсутствует";

/// "About us" page, or a placeholder when none was written yet
#[utoipa::path(
    get,
    path = "/api/about",
    responses(
        (status = 200, description = "About page", body = AboutContentResponse)
    ),
    tag = "content"
)]
pub async fn get_about(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AboutContentResponse>> {
    debug!("Getting about page");

    let about = about_content::Entity::find()
        .order_by_asc(about_content::Column::Id)
        .one(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(match about {
        Some(about) => AboutContentResponse {
            title: about.title,
            content: about.content,
            image: about.image,
        },
        None => AboutContentResponse {
            title: ABOUT_PLACEHOLDER_TITLE.to_string(),
            content: ABOUT_PLACEHOLDER_CONTENT.to_string(),
            image: String::new(),
        },
    }))
}

/// Contact details, or a placeholder
#[utoipa::path(
    get,
    path = "/api/contact",
    responses(
        (status = 200, description = "Contact details", body = ContactInfoResponse)
    ),
    tag = "content"
)]
pub async fn get_contact(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ContactInfoResponse>> {
    debug!("Getting contact info");

    let contact = contact_info::Entity::find()
        .order_by_asc(contact_info::Column::Id)
        .one(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(match contact {
        Some(c) => ContactInfoResponse {
            phone: c.phone,
            email: c.email,
            address: c.address,
            map_url: c.map_url,
        },
        None => ContactInfoResponse {
            phone: String::new(),
            email: String::new(),
            address: CONTACT_PLACEHOLDER_ADDRESS.to_string(),
            map_url: None,
        },
    }))
}

/// Submit a message through the contact form
#[utoipa::path(
    post,
    path = "/api/contact/message",
    request_body = ContactMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = MessageResponse),
        (status = 400, description = "Invalid message", body = ErrorResponse)
    ),
    tag = "content"
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContactMessageRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let req = body(payload)?;

    let mut errors = FieldErrors::new();
    errors.require("name", req.name.as_deref());
    errors.max_len("name", req.name.as_deref(), 100);
    errors.require("email", req.email.as_deref());
    errors.email("email", req.email.as_deref());
    errors.require("message", req.message.as_deref());
    errors.into_result()?;

    let message = contact_message::ActiveModel {
        name: Set(req.name.unwrap_or_default().trim().to_string()),
        email: Set(req.email.unwrap_or_default().trim().to_string()),
        message: Set(req.message.unwrap_or_default()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!("Contact message {} received from {}", message.id, message.email);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Ваше сообщение успешно отправлено!")),
    ))
}
