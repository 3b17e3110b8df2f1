use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use catalog_db::entities::{image, product};
use catalog_db::product_filter::icontains;
use sea_orm::sea_query::Condition;
use sea_orm::{ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder};
use tracing::{debug, info};

use crate::assemble::{admin_product, admin_products};
use crate::error::{db_error, media_error, not_found, ApiResult, ErrorResponse, Missing};
use crate::handlers::body;
use crate::handlers::products::store_product_images;
use crate::media::read_uploads;
use crate::models::{AdminProduct, AdminProductRequest, SuccessResponse, UploadedImages};
use crate::pagination::{fetch_page, Page, PageRequest};
use crate::product_write::{self, ProductChanges, ADMIN_FIELDS};
use crate::query::{id_param, param, Params};
use crate::AppState;

async fn find(state: &AppState, id: i32) -> ApiResult<product::Model> {
    product::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Product))
}

/// List products for the admin
#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 100)"),
        ("search" = Option<String>, Query, description = "Substring of name or either SKU"),
        ("category" = Option<i32>, Query, description = "Category id"),
        ("brand" = Option<i32>, Query, description = "Brand id"),
        ("is_available" = Option<String>, Query, description = "`true`/`1` for available, anything else for unavailable")
    ),
    responses(
        (status = 200, description = "Products", body = Page<AdminProduct>)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-products"
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Page<AdminProduct>>> {
    debug!("Admin: listing products");

    let request = PageRequest::from_params(&params)?;
    let mut query = product::Entity::find()
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id);

    if let Some(term) = param(&params, "search") {
        query = query.filter(
            Condition::any()
                .add(icontains(product::Entity, product::Column::Name, term))
                .add(icontains(product::Entity, product::Column::InternalSku, term))
                .add(icontains(product::Entity, product::Column::ManufacturerSku, term)),
        );
    }
    if let Some(category_id) = id_param(&params, "category") {
        query = query.filter(product::Column::CategoryId.eq(category_id));
    }
    if let Some(brand_id) = id_param(&params, "brand") {
        query = query.filter(product::Column::BrandId.eq(brand_id));
    }
    if let Some(flag) = params.get("is_available") {
        let wanted = matches!(flag.trim().to_lowercase().as_str(), "true" | "1");
        query = query.filter(product::Column::IsAvailable.eq(wanted));
    }

    let page = fetch_page(&state.db, query, request).await?;
    let results = admin_products(&state.db, &state.media, page.results)
        .await
        .map_err(db_error)?;

    Ok(Json(Page {
        count: page.count,
        next: page.next,
        previous: page.previous,
        results,
    }))
}

/// Create a product with its features, tag groups and image edits
#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = AdminProductRequest,
    responses(
        (status = 201, description = "Product created", body = AdminProduct),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Internal SKU could not be generated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-products"
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AdminProductRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminProduct>)> {
    let changes = ProductChanges::from(body(payload)?);
    let category = product_write::validate(&state.db, &changes, None, ADMIN_FIELDS).await?;
    let saved = product_write::save(&state.db, None, changes, &category).await?;

    let product = admin_product(&state.db, &state.media, saved)
        .await
        .map_err(db_error)?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product
#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product", body = AdminProduct),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-products"
)]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<AdminProduct>> {
    let product = find(&state, id).await?;
    admin_product(&state.db, &state.media, product)
        .await
        .map(Json)
        .map_err(db_error)
}

/// Update a product; nested lists present in the payload replace the stored ones
#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    request_body = AdminProductRequest,
    responses(
        (status = 200, description = "Product updated", body = AdminProduct),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-products"
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<AdminProductRequest>, JsonRejection>,
) -> ApiResult<Json<AdminProduct>> {
    let existing = find(&state, id).await?;
    let changes = ProductChanges::from(body(payload)?);
    let category =
        product_write::validate(&state.db, &changes, Some(&existing), ADMIN_FIELDS).await?;
    let saved = product_write::save(&state.db, Some(existing), changes, &category).await?;

    admin_product(&state.db, &state.media, saved)
        .await
        .map(Json)
        .map_err(db_error)
}

/// Delete a product and its images
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-products"
)]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let product = find(&state, id).await?;
    let files: Vec<String> = product
        .find_related(image::Entity)
        .all(&state.db)
        .await
        .map_err(db_error)?
        .into_iter()
        .filter_map(|i| i.image)
        .collect();

    product.delete(&state.db).await.map_err(db_error)?;
    for file in &files {
        state.media.remove(file).await;
    }

    info!("Admin: deleted product {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Upload images for a product
#[utoipa::path(
    post,
    path = "/api/admin/products/{id}/upload-image",
    params(
        ("id" = i32, Path, description = "Product id")
    ),
    request_body(content_type = "multipart/form-data", description = "`images` file fields, or a single `image`"),
    responses(
        (status = 201, description = "Images stored", body = UploadedImages),
        (status = 400, description = "No images provided", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-products"
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadedImages>)> {
    let product = find(&state, id).await?;
    let uploads = read_uploads(&mut multipart, &["images", "image"])
        .await
        .map_err(media_error)?;

    // A lone `image` field is only used when no `images` were sent
    let uploads = if uploads.iter().any(|u| u.field == "images") {
        uploads.into_iter().filter(|u| u.field == "images").collect()
    } else {
        uploads.into_iter().take(1).collect()
    };

    let images = store_product_images(&state, product.id, uploads).await?;
    Ok((StatusCode::CREATED, Json(UploadedImages { images })))
}

/// Delete one image of a product
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}/delete-image/{image_id}",
    params(
        ("id" = i32, Path, description = "Product id"),
        ("image_id" = i32, Path, description = "Image id")
    ),
    responses(
        (status = 200, description = "Image deleted", body = SuccessResponse),
        (status = 404, description = "Product or image not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-products"
)]
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    Path((id, image_id)): Path<(i32, i32)>,
) -> ApiResult<Json<SuccessResponse>> {
    let product = find(&state, id).await?;
    let image = image::Entity::find_by_id(image_id)
        .filter(image::Column::ProductId.eq(product.id))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Image))?;

    let file = image.image.clone();
    image.delete(&state.db).await.map_err(db_error)?;
    if let Some(file) = file {
        state.media.remove(&file).await;
    }

    info!("Admin: deleted image {} of product {}", image_id, id);
    Ok(Json(SuccessResponse { success: true }))
}
