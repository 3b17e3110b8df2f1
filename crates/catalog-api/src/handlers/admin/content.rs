//! Admin editing of the about page, contact details and visitor messages

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use catalog_db::entities::{about_content, contact_info, contact_message};
use catalog_db::CatalogError;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info};

use crate::error::{
    catalog_error, db_error, not_found, ApiResult, ErrorResponse, FieldErrors, Missing,
};
use crate::handlers::body;
use crate::models::{
    AdminAboutContent, AdminAboutRequest, AdminContactInfo, AdminContactRequest, AdminMessage,
    AdminMessageRequest, MessageStatusResponse,
};
use crate::query::Params;
use crate::AppState;

const DEFAULT_ABOUT_TITLE: &str = "О нас";

/// The about row, created with defaults when missing
async fn about_row(db: &DatabaseConnection) -> ApiResult<about_content::Model> {
    let first = || {
        about_content::Entity::find()
            .order_by_asc(about_content::Column::Id)
            .one(db)
    };
    if let Some(row) = first().await.map_err(db_error)? {
        return Ok(row);
    }

    let created = about_content::ActiveModel {
        title: Set(DEFAULT_ABOUT_TITLE.to_string()),
        content: Set(String::new()),
        ..Default::default()
    }
    .insert(db)
    .await;

    match created {
        Ok(row) => Ok(row),
        // Another request created it first
        Err(err) => match CatalogError::from_singleton(err, "about_content") {
            CatalogError::SingletonExists(table) => first()
                .await
                .map_err(db_error)?
                .ok_or_else(|| catalog_error(CatalogError::SingletonExists(table))),
            other => Err(catalog_error(other)),
        },
    }
}

/// The contact row, created empty when missing
async fn contact_row(db: &DatabaseConnection) -> ApiResult<contact_info::Model> {
    let first = || {
        contact_info::Entity::find()
            .order_by_asc(contact_info::Column::Id)
            .one(db)
    };
    if let Some(row) = first().await.map_err(db_error)? {
        return Ok(row);
    }

    let created = contact_info::ActiveModel {
        phone: Set(String::new()),
        email: Set(String::new()),
        address: Set(String::new()),
        map_url: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await;

    match created {
        Ok(row) => Ok(row),
        Err(err) => match CatalogError::from_singleton(err, "contact_info") {
            CatalogError::SingletonExists(table) => first()
                .await
                .map_err(db_error)?
                .ok_or_else(|| catalog_error(CatalogError::SingletonExists(table))),
            other => Err(catalog_error(other)),
        },
    }
}

fn admin_about(model: about_content::Model) -> AdminAboutContent {
    AdminAboutContent {
        id: model.id,
        title: model.title,
        content: model.content,
        image: model.image,
        updated_at: model.updated_at,
    }
}

fn admin_contact(model: contact_info::Model) -> AdminContactInfo {
    AdminContactInfo {
        id: model.id,
        phone: model.phone,
        email: model.email,
        address: model.address,
        map_url: model.map_url,
        updated_at: model.updated_at,
    }
}

fn admin_message(model: contact_message::Model) -> AdminMessage {
    AdminMessage {
        id: model.id,
        name: model.name,
        email: model.email,
        message: model.message,
        created_at: model.created_at,
        is_processed: model.is_processed,
    }
}

/// Get the about page
#[utoipa::path(
    get,
    path = "/api/admin/about",
    responses(
        (status = 200, description = "About page", body = AdminAboutContent)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn get_about(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AdminAboutContent>> {
    Ok(Json(admin_about(about_row(&state.db).await?)))
}

/// Update the about page
#[utoipa::path(
    put,
    path = "/api/admin/about",
    request_body = AdminAboutRequest,
    responses(
        (status = 200, description = "About page updated", body = AdminAboutContent),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn update_about(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AdminAboutRequest>, JsonRejection>,
) -> ApiResult<Json<AdminAboutContent>> {
    let req = body(payload)?;
    let mut errors = FieldErrors::new();
    errors.not_blank("title", req.title.as_deref());
    errors.max_len("title", req.title.as_deref(), 200);
    errors.into_result()?;

    let mut active: about_content::ActiveModel = about_row(&state.db).await?.into();
    if let Some(title) = req.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(content) = req.content {
        active.content = Set(content);
    }
    if let Some(image) = req.image {
        active.image = Set(image.trim().to_string());
    }
    let model = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin: updated about page");
    Ok(Json(admin_about(model)))
}

/// Get the contact details
#[utoipa::path(
    get,
    path = "/api/admin/contact",
    responses(
        (status = 200, description = "Contact details", body = AdminContactInfo)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn get_contact(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AdminContactInfo>> {
    Ok(Json(admin_contact(contact_row(&state.db).await?)))
}

/// Update the contact details
#[utoipa::path(
    put,
    path = "/api/admin/contact",
    request_body = AdminContactRequest,
    responses(
        (status = 200, description = "Contact details updated", body = AdminContactInfo),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AdminContactRequest>, JsonRejection>,
) -> ApiResult<Json<AdminContactInfo>> {
    let req = body(payload)?;
    let mut errors = FieldErrors::new();
    errors.max_len("phone", req.phone.as_deref(), 50);
    errors.email("email", req.email.as_deref());
    errors.into_result()?;

    let mut active: contact_info::ActiveModel = contact_row(&state.db).await?.into();
    if let Some(phone) = req.phone {
        active.phone = Set(phone.trim().to_string());
    }
    if let Some(email) = req.email {
        active.email = Set(email.trim().to_string());
    }
    if let Some(address) = req.address {
        active.address = Set(address);
    }
    if let Some(map_url) = req.map_url {
        active.map_url = Set(map_url.filter(|u| !u.trim().is_empty()));
    }
    let model = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin: updated contact details");
    Ok(Json(admin_contact(model)))
}

async fn find_message(db: &DatabaseConnection, id: i32) -> ApiResult<contact_message::Model> {
    contact_message::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Message))
}

/// List visitor messages, newest first
#[utoipa::path(
    get,
    path = "/api/admin/messages",
    params(
        ("is_processed" = Option<String>, Query, description = "`true` for processed, anything else for unprocessed")
    ),
    responses(
        (status = 200, description = "Messages", body = Vec<AdminMessage>)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Vec<AdminMessage>>> {
    debug!("Admin: listing messages");

    let mut query = contact_message::Entity::find()
        .order_by_desc(contact_message::Column::CreatedAt)
        .order_by_desc(contact_message::Column::Id);
    if let Some(flag) = params.get("is_processed") {
        let wanted = flag.trim().eq_ignore_ascii_case("true");
        query = query.filter(contact_message::Column::IsProcessed.eq(wanted));
    }

    let messages = query.all(&state.db).await.map_err(db_error)?;
    Ok(Json(messages.into_iter().map(admin_message).collect()))
}

/// Get a message
#[utoipa::path(
    get,
    path = "/api/admin/messages/{id}",
    params(("id" = i32, Path, description = "Message id")),
    responses(
        (status = 200, description = "Message", body = AdminMessage),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<AdminMessage>> {
    Ok(Json(admin_message(find_message(&state.db, id).await?)))
}

/// Update a message's processed flag
#[utoipa::path(
    put,
    path = "/api/admin/messages/{id}",
    params(("id" = i32, Path, description = "Message id")),
    request_body = AdminMessageRequest,
    responses(
        (status = 200, description = "Message updated", body = AdminMessage),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn update_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<AdminMessageRequest>, JsonRejection>,
) -> ApiResult<Json<AdminMessage>> {
    let existing = find_message(&state.db, id).await?;
    let req = body(payload)?;

    let model = match req.is_processed {
        Some(is_processed) => set_processed(&state.db, existing, is_processed).await?,
        None => existing,
    };
    Ok(Json(admin_message(model)))
}

/// Delete a message
#[utoipa::path(
    delete,
    path = "/api/admin/messages/{id}",
    params(("id" = i32, Path, description = "Message id")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let model = find_message(&state.db, id).await?;
    model.delete(&state.db).await.map_err(db_error)?;
    info!("Admin: deleted message {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn set_processed(
    db: &DatabaseConnection,
    message: contact_message::Model,
    is_processed: bool,
) -> ApiResult<contact_message::Model> {
    let mut active: contact_message::ActiveModel = message.into();
    active.is_processed = Set(is_processed);
    let model = active.update(db).await.map_err(db_error)?;
    info!(
        "Admin: message {} marked {}",
        model.id,
        if is_processed { "processed" } else { "unprocessed" }
    );
    Ok(model)
}

/// Mark a message processed
#[utoipa::path(
    post,
    path = "/api/admin/messages/{id}/mark-processed",
    params(("id" = i32, Path, description = "Message id")),
    responses(
        (status = 200, description = "Message marked processed", body = MessageStatusResponse),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn mark_processed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<MessageStatusResponse>> {
    let message = find_message(&state.db, id).await?;
    let model = set_processed(&state.db, message, true).await?;
    Ok(Json(MessageStatusResponse {
        status: "processed".to_string(),
        id: model.id,
    }))
}

/// Mark a message unprocessed
#[utoipa::path(
    post,
    path = "/api/admin/messages/{id}/mark-unprocessed",
    params(("id" = i32, Path, description = "Message id")),
    responses(
        (status = 200, description = "Message marked unprocessed", body = MessageStatusResponse),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn mark_unprocessed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<MessageStatusResponse>> {
    let message = find_message(&state.db, id).await?;
    let model = set_processed(&state.db, message, false).await?;
    Ok(Json(MessageStatusResponse {
        status: "unprocessed".to_string(),
        id: model.id,
    }))
}
