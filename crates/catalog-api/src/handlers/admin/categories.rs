use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use catalog_db::category_tree::CategoryForest;
use catalog_db::entities::category;
use catalog_db::product_filter::icontains;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info};

use crate::error::{
    bad_request, db_error, media_error, not_found, ApiResult, ErrorResponse, FieldErrors, Missing,
};
use crate::handlers::{body, non_blank};
use crate::media::{read_uploads, MediaStore};
use crate::models::{AdminCategory, AdminCategoryRequest, ImageUrlResponse};
use crate::query::{param, parse_id, Params};
use crate::AppState;

const CATEGORY_IMAGE_FOLDER: &str = "categories";
const NAME_MAX_LEN: usize = 200;

fn admin_category(model: category::Model, forest: &CategoryForest, media: &MediaStore) -> AdminCategory {
    AdminCategory {
        parent_name: model
            .parent_id
            .and_then(|id| forest.get(id))
            .map(|p| p.name.clone()),
        products_count: forest.direct_count(model.id),
        image: media.url_opt(model.image.as_deref()),
        id: model.id,
        name: model.name,
        slug: model.slug,
        parent: model.parent_id,
        order: model.sort_order,
    }
}

async fn find(db: &DatabaseConnection, id: i32) -> ApiResult<category::Model> {
    category::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Category))
}

async fn respond(state: &AppState, model: category::Model) -> ApiResult<AdminCategory> {
    let forest = CategoryForest::load(&state.db).await.map_err(db_error)?;
    Ok(admin_category(model, &forest, &state.media))
}

/// Check the payload; `id` is the category being updated, if any
async fn validate(
    db: &DatabaseConnection,
    req: &AdminCategoryRequest,
    id: Option<i32>,
) -> ApiResult<()> {
    let mut errors = FieldErrors::new();
    if id.is_none() {
        errors.require("name", req.name.as_deref());
    } else {
        errors.not_blank("name", req.name.as_deref());
    }
    errors.max_len("name", req.name.as_deref(), NAME_MAX_LEN);
    errors.max_len(
        "slug",
        req.slug.as_ref().and_then(|s| s.as_deref()),
        category::SLUG_MAX_LEN,
    );

    if let Some(Some(parent_id)) = req.parent {
        let forest = CategoryForest::load(db).await.map_err(db_error)?;
        if forest.get(parent_id).is_none() {
            errors.missing_ref("parent", parent_id);
        } else if let Some(id) = id {
            // The new parent must not sit inside the category's own subtree
            if forest.index().descendants_of(id).contains(&parent_id) {
                errors.add("parent", "A category cannot be placed under itself.");
            }
        }
    }

    errors.into_result()
}

/// List categories by `(order, name)`
#[utoipa::path(
    get,
    path = "/api/admin/categories",
    params(
        ("search" = Option<String>, Query, description = "Substring of the name"),
        ("parent" = Option<String>, Query, description = "Parent id, or `null` for roots")
    ),
    responses(
        (status = 200, description = "Categories", body = Vec<AdminCategory>)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Vec<AdminCategory>>> {
    debug!("Admin: listing categories");

    let mut query = category::Entity::find()
        .order_by_asc(category::Column::SortOrder)
        .order_by_asc(category::Column::Name);
    if let Some(term) = param(&params, "search") {
        query = query.filter(icontains(category::Entity, category::Column::Name, term));
    }
    match param(&params, "parent") {
        Some("null") => query = query.filter(category::Column::ParentId.is_null()),
        Some(raw) => {
            // An unparsable parent id matches nothing
            let parent_id = parse_id(raw).unwrap_or(-1);
            query = query.filter(category::Column::ParentId.eq(parent_id));
        }
        None => {}
    }

    let models = query.all(&state.db).await.map_err(db_error)?;
    let forest = CategoryForest::load(&state.db).await.map_err(db_error)?;
    Ok(Json(
        models
            .into_iter()
            .map(|m| admin_category(m, &forest, &state.media))
            .collect(),
    ))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = AdminCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = AdminCategory),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AdminCategoryRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminCategory>)> {
    let req = body(payload)?;
    validate(&state.db, &req, None).await?;

    let model = category::ActiveModel {
        name: Set(req.name.unwrap_or_default().trim().to_string()),
        slug: Set(non_blank(req.slug.flatten().as_deref()).unwrap_or_default()),
        parent_id: Set(req.parent.flatten()),
        sort_order: Set(req.order.unwrap_or(0)),
        image: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!("Admin: created category {} ({})", model.id, model.slug);
    Ok((StatusCode::CREATED, Json(respond(&state, model).await?)))
}

/// Get a category
#[utoipa::path(
    get,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category", body = AdminCategory),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<AdminCategory>> {
    let model = find(&state.db, id).await?;
    Ok(Json(respond(&state, model).await?))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category id")
    ),
    request_body = AdminCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = AdminCategory),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<AdminCategoryRequest>, JsonRejection>,
) -> ApiResult<Json<AdminCategory>> {
    let existing = find(&state.db, id).await?;
    let req = body(payload)?;
    validate(&state.db, &req, Some(id)).await?;

    let mut active: category::ActiveModel = existing.into();
    if let Some(name) = req.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(slug) = non_blank(req.slug.flatten().as_deref()) {
        active.slug = Set(slug);
    }
    if let Some(parent) = req.parent {
        active.parent_id = Set(parent);
    }
    if let Some(order) = req.order {
        active.sort_order = Set(order);
    }
    let model = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin: updated category {}", model.id);
    Ok(Json(respond(&state, model).await?))
}

/// Delete a category together with its subcategories
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = i32, Path, description = "Category id")
    ),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let model = find(&state.db, id).await?;
    let image = model.image.clone();
    model.delete(&state.db).await.map_err(db_error)?;
    if let Some(image) = image {
        state.media.remove(&image).await;
    }

    info!("Admin: deleted category {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the category image
#[utoipa::path(
    post,
    path = "/api/admin/categories/{id}/upload-image",
    params(
        ("id" = i32, Path, description = "Category id")
    ),
    request_body(content_type = "multipart/form-data", description = "An `image` file field"),
    responses(
        (status = 200, description = "Image stored", body = ImageUrlResponse),
        (status = 400, description = "No image provided", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImageUrlResponse>> {
    let model = find(&state.db, id).await?;
    let upload = read_uploads(&mut multipart, &["image"])
        .await
        .map_err(media_error)?
        .into_iter()
        .next()
        .ok_or_else(|| bad_request("NO_IMAGE", "No image provided"))?;

    let path = state
        .media
        .save(CATEGORY_IMAGE_FOLDER, &upload)
        .await
        .map_err(media_error)?;
    let previous = model.image.clone();

    let mut active: category::ActiveModel = model.into();
    active.image = Set(Some(path));
    let model = active.update(&state.db).await.map_err(db_error)?;
    if let Some(previous) = previous {
        state.media.remove(&previous).await;
    }

    info!("Admin: new image for category {}", id);
    Ok(Json(ImageUrlResponse {
        image: state.media.url_opt(model.image.as_deref()),
    }))
}
