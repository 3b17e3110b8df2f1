use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use catalog_db::category_tree;
use catalog_db::entities::{category, feature_value, image, product, product_feature};
use catalog_db::product_filter::icontains;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::sea_query::Query as SqlQuery;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::assemble::{product_detail, product_list};
use crate::error::{
    bad_request, db_error, media_error, not_found, ApiResult, ErrorResponse, Missing,
};
use crate::media::{read_uploads, MediaStore, Upload};
use crate::models::{
    PriceRange, ProductDetail, ProductListItem, ProductWriteRequest, UploadedImage,
    UploadedImages,
};
use crate::pagination::{fetch_page, Page, PageRequest};
use crate::product_write::{self, ProductChanges, PUBLIC_FIELDS};
use crate::query::{param, product_filter};
use crate::AppState;

use super::body;

/// Media folder for product images
pub(crate) const PRODUCT_IMAGE_FOLDER: &str = "products";

pub(crate) async fn find_by_slug(db: &DatabaseConnection, slug: &str) -> ApiResult<product::Model> {
    product::Entity::find()
        .filter(product::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Product))
}

/// Filter, order and paginate `base`, then assemble the listing
pub(crate) async fn list_products_page(
    state: &AppState,
    base: Select<product::Entity>,
    params: &HashMap<String, String>,
) -> ApiResult<Page<ProductListItem>> {
    let request = PageRequest::from_params(params)?;
    let filter = product_filter(params);
    let query = filter.apply(&state.db, base).await.map_err(db_error)?;

    let page = fetch_page(&state.db, query, request).await?;
    let results = product_list(&state.db, &state.media, page.results)
        .await
        .map_err(db_error)?;
    Ok(Page {
        count: page.count,
        next: page.next,
        previous: page.previous,
        results,
    })
}

/// List products
#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 100)"),
        ("tag" = Option<String>, Query, description = "Comma-separated tag slugs or names"),
        ("price_min" = Option<String>, Query, description = "Lowest price"),
        ("price_max" = Option<String>, Query, description = "Highest price"),
        ("brand" = Option<String>, Query, description = "Comma-separated brand slugs"),
        ("is_available" = Option<bool>, Query, description = "Availability"),
        ("search" = Option<String>, Query, description = "Substring of name or description"),
        ("category" = Option<String>, Query, description = "Category slug, subtree included"),
        ("ordering" = Option<String>, Query, description = "name, -name, price, -price, created_at, -created_at")
    ),
    responses(
        (status = 200, description = "Products", body = Page<ProductListItem>),
        (status = 404, description = "Invalid page", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Page<ProductListItem>>> {
    debug!("Listing products");

    list_products_page(&state, product::Entity::find(), &params)
        .await
        .map(Json)
}

/// Get a product by slug
#[utoipa::path(
    get,
    path = "/api/products/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Product", body = ProductDetail),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<ProductDetail>> {
    debug!("Getting product: {}", slug);

    let product = find_by_slug(&state.db, &slug).await?;
    product_detail(&state.db, &state.media, product)
        .await
        .map(Json)
        .map_err(db_error)
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductWriteRequest,
    responses(
        (status = 201, description = "Product created", body = ProductDetail),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 409, description = "Internal SKU could not be generated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProductWriteRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProductDetail>)> {
    let changes = ProductChanges::from(body(payload)?);
    let category = product_write::validate(&state.db, &changes, None, PUBLIC_FIELDS).await?;
    let saved = product_write::save(&state.db, None, changes, &category).await?;

    info!("Product created via public API: {}", saved.slug);

    let detail = product_detail(&state.db, &state.media, saved)
        .await
        .map_err(db_error)?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/api/products/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    request_body = ProductWriteRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductDetail),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    payload: Result<Json<ProductWriteRequest>, JsonRejection>,
) -> ApiResult<Json<ProductDetail>> {
    let existing = find_by_slug(&state.db, &slug).await?;
    let changes = ProductChanges::from(body(payload)?);
    let category =
        product_write::validate(&state.db, &changes, Some(&existing), PUBLIC_FIELDS).await?;
    let saved = product_write::save(&state.db, Some(existing), changes, &category).await?;

    info!("Product updated via public API: {}", saved.slug);

    product_detail(&state.db, &state.media, saved)
        .await
        .map(Json)
        .map_err(db_error)
}

/// Price bounds of all products, or of a category subtree
#[utoipa::path(
    get,
    path = "/api/products/price-range",
    params(
        ("category" = Option<String>, Query, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Price range", body = PriceRange)
    ),
    tag = "products"
)]
pub async fn price_range(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<PriceRange>> {
    debug!("Computing price range");

    let mut query = product::Entity::find().filter(product::Column::Price.is_not_null());
    if let Some(slug) = param(&params, "category") {
        let Some(category) = category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&state.db)
            .await
            .map_err(db_error)?
        else {
            return Ok(Json(PriceRange {
                min_price: None,
                max_price: None,
            }));
        };
        let ids = category_tree::subtree_ids(&state.db, category.id)
            .await
            .map_err(db_error)?;
        query = query.filter(product::Column::CategoryId.is_in(ids));
    }

    let prices: Vec<Option<Decimal>> = query
        .select_only()
        .column(product::Column::Price)
        .into_tuple()
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let prices = prices.into_iter().flatten();
    let (min, max) = prices.fold((None::<Decimal>, None::<Decimal>), |(lo, hi), p| {
        (
            Some(lo.map_or(p, |lo| lo.min(p))),
            Some(hi.map_or(p, |hi| hi.max(p))),
        )
    });

    Ok(Json(PriceRange {
        min_price: min.and_then(|d| d.to_f64()),
        max_price: max.and_then(|d| d.to_f64()),
    }))
}

/// Upload images for a product
#[utoipa::path(
    post,
    path = "/api/products/{slug}/upload-image",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    request_body(content_type = "multipart/form-data", description = "One or more `images` file fields"),
    responses(
        (status = 201, description = "Images stored", body = UploadedImages),
        (status = 400, description = "No images provided", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadedImages>)> {
    let product = find_by_slug(&state.db, &slug).await?;
    let uploads = read_uploads(&mut multipart, &["images"])
        .await
        .map_err(media_error)?;

    let images = store_product_images(&state, product.id, uploads).await?;
    Ok((StatusCode::CREATED, Json(UploadedImages { images })))
}

/// Save uploads as new images of `product_id`.
///
/// Rows are inserted in one transaction once every file is written; on
/// failure the files written so far are removed again.
pub(crate) async fn store_product_images(
    state: &AppState,
    product_id: i32,
    uploads: Vec<Upload>,
) -> ApiResult<Vec<UploadedImage>> {
    if uploads.is_empty() {
        return Err(bad_request("NO_IMAGES", "No images provided"));
    }

    let mut paths = Vec::with_capacity(uploads.len());
    for upload in &uploads {
        match state.media.save(PRODUCT_IMAGE_FOLDER, upload).await {
            Ok(path) => paths.push(path),
            Err(e) => {
                discard_files(&state.media, &paths).await;
                return Err(media_error(e));
            }
        }
    }

    let rows = match insert_image_rows(&state.db, product_id, &paths).await {
        Ok(rows) => rows,
        Err(e) => {
            discard_files(&state.media, &paths).await;
            return Err(db_error(e));
        }
    };

    let stored: Vec<UploadedImage> = rows
        .into_iter()
        .map(|row| UploadedImage {
            id: row.id,
            image: state.media.url_opt(row.image.as_deref()),
        })
        .collect();
    info!("Stored {} image(s) for product {}", stored.len(), product_id);
    Ok(stored)
}

async fn insert_image_rows(
    db: &DatabaseConnection,
    product_id: i32,
    paths: &[String],
) -> Result<Vec<image::Model>, DbErr> {
    let txn = db.begin().await?;
    let mut rows = Vec::with_capacity(paths.len());
    for path in paths {
        let row = image::ActiveModel {
            product_id: Set(product_id),
            image: Set(Some(path.clone())),
            is_main: Set(false),
            sort_order: Set(0),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        rows.push(row);
    }
    txn.commit().await?;
    Ok(rows)
}

async fn discard_files(media: &MediaStore, paths: &[String]) {
    for path in paths {
        media.remove(path).await;
    }
}

/// Products having a feature value that contains `value`
#[utoipa::path(
    get,
    path = "/api/products/by-feature",
    params(
        ("value" = String, Query, description = "Substring of a feature value")
    ),
    responses(
        (status = 200, description = "Products", body = Vec<ProductListItem>),
        (status = 400, description = "Missing value parameter", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn products_by_feature(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<ProductListItem>>> {
    let Some(value) = param(&params, "value") else {
        return Err(bad_request("MISSING_PARAMETER", "value parameter is required"));
    };
    debug!("Listing products by feature value: {}", value);

    let matching = SqlQuery::select()
        .column((product_feature::Entity, product_feature::Column::ProductId))
        .from(product_feature::Entity)
        .inner_join(
            feature_value::Entity,
            sea_orm::sea_query::Expr::col((feature_value::Entity, feature_value::Column::Id))
                .equals((product_feature::Entity, product_feature::Column::ValueId)),
        )
        .and_where(icontains(
            feature_value::Entity,
            feature_value::Column::Value,
            value,
        ))
        .to_owned();

    let products = product::Entity::find()
        .filter(product::Column::Id.in_subquery(matching))
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    product_list(&state.db, &state.media, products)
        .await
        .map(Json)
        .map_err(db_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ConnectionTrait;

    async fn test_state(media_root: &std::path::Path) -> AppState {
        let db = catalog_db::connect("sqlite::memory:").await.unwrap();
        catalog_db::migrate(&db).await.unwrap();
        AppState {
            db,
            media: MediaStore::new(media_root, "/media/"),
            jwt_secret: "test-secret".to_string(),
            access_ttl: chrono::Duration::minutes(5),
            refresh_ttl: chrono::Duration::days(1),
        }
    }

    fn png(name: &str) -> Upload {
        Upload {
            field: "images".to_string(),
            file_name: Some(name.to_string()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[tokio::test]
    async fn test_failed_insert_removes_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;
        state
            .db
            .execute_unprepared("DROP TABLE images")
            .await
            .unwrap();

        let result = store_product_images(&state, 1, vec![png("a.png"), png("b.png")]).await;
        assert!(result.is_err());

        let left = std::fs::read_dir(dir.path().join(PRODUCT_IMAGE_FOLDER))
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(left, 0);
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path()).await;

        let err = store_product_images(&state, 1, Vec::new()).await.unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
