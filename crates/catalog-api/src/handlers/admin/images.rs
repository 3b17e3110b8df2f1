use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use catalog_db::entities::{image, product};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info};

use crate::error::{db_error, not_found, ApiResult, ErrorResponse, FieldErrors, Missing};
use crate::handlers::{body, non_blank};
use crate::media::MediaStore;
use crate::models::{AdminImage, AdminImageRequest};
use crate::query::{id_param, Params};
use crate::AppState;

fn admin_image(model: image::Model, media: &MediaStore) -> AdminImage {
    AdminImage {
        id: model.id,
        product: model.product_id,
        image: media.url_opt(model.image.as_deref()),
        is_main: model.is_main,
        order: model.sort_order,
    }
}

async fn find(db: &DatabaseConnection, id: i32) -> ApiResult<image::Model> {
    image::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Image))
}

async fn check_request(
    db: &DatabaseConnection,
    req: &AdminImageRequest,
    creating: bool,
) -> ApiResult<()> {
    let mut errors = FieldErrors::new();
    match req.product {
        Some(product_id) => {
            let found = product::Entity::find_by_id(product_id)
                .one(db)
                .await
                .map_err(db_error)?;
            if found.is_none() {
                errors.missing_ref("product", product_id);
            }
        }
        None if creating => errors.add("product", crate::error::REQUIRED),
        None => {}
    }
    if let Some(Some(path)) = &req.image {
        let path = path.trim();
        if !path.is_empty() && !MediaStore::is_relative_path(path) {
            errors.add("image", "Must be a path relative to the media root.");
        }
    }
    errors.into_result()
}

/// List product images by order
#[utoipa::path(
    get,
    path = "/api/admin/images",
    params(
        ("product" = Option<i32>, Query, description = "Product id")
    ),
    responses(
        (status = 200, description = "Images", body = Vec<AdminImage>)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Vec<AdminImage>>> {
    debug!("Admin: listing images");

    let mut query = image::Entity::find()
        .order_by_asc(image::Column::SortOrder)
        .order_by_asc(image::Column::Id);
    if let Some(product_id) = id_param(&params, "product") {
        query = query.filter(image::Column::ProductId.eq(product_id));
    }

    let images = query.all(&state.db).await.map_err(db_error)?;
    Ok(Json(
        images
            .into_iter()
            .map(|i| admin_image(i, &state.media))
            .collect(),
    ))
}

/// Create an image row
#[utoipa::path(
    post,
    path = "/api/admin/images",
    request_body = AdminImageRequest,
    responses(
        (status = 201, description = "Image created", body = AdminImage),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AdminImageRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminImage>)> {
    let req = body(payload)?;
    check_request(&state.db, &req, true).await?;

    let model = image::ActiveModel {
        product_id: Set(req.product.unwrap_or_default()),
        image: Set(non_blank(req.image.flatten().as_deref())),
        is_main: Set(req.is_main.unwrap_or(false)),
        sort_order: Set(req.order.unwrap_or(0)),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!("Admin: created image {} for product {}", model.id, model.product_id);
    Ok((StatusCode::CREATED, Json(admin_image(model, &state.media))))
}

/// Get an image
#[utoipa::path(
    get,
    path = "/api/admin/images/{id}",
    params(("id" = i32, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image", body = AdminImage),
        (status = 404, description = "Image not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<AdminImage>> {
    let model = find(&state.db, id).await?;
    Ok(Json(admin_image(model, &state.media)))
}

/// Update an image row
#[utoipa::path(
    put,
    path = "/api/admin/images/{id}",
    params(("id" = i32, Path, description = "Image id")),
    request_body = AdminImageRequest,
    responses(
        (status = 200, description = "Image updated", body = AdminImage),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<AdminImageRequest>, JsonRejection>,
) -> ApiResult<Json<AdminImage>> {
    let existing = find(&state.db, id).await?;
    let req = body(payload)?;
    check_request(&state.db, &req, false).await?;

    let mut active: image::ActiveModel = existing.into();
    if let Some(product_id) = req.product {
        active.product_id = Set(product_id);
    }
    if let Some(path) = req.image {
        active.image = Set(non_blank(path.as_deref()));
    }
    if let Some(is_main) = req.is_main {
        active.is_main = Set(is_main);
    }
    if let Some(order) = req.order {
        active.sort_order = Set(order);
    }
    let model = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin: updated image {}", model.id);
    Ok(Json(admin_image(model, &state.media)))
}

/// Delete an image and its file
#[utoipa::path(
    delete,
    path = "/api/admin/images/{id}",
    params(("id" = i32, Path, description = "Image id")),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "Image not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let model = find(&state.db, id).await?;
    let file = model.image.clone();
    model.delete(&state.db).await.map_err(db_error)?;
    if let Some(file) = file {
        state.media.remove(&file).await;
    }

    info!("Admin: deleted image {}", id);
    Ok(StatusCode::NO_CONTENT)
}
