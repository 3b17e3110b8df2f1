use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use catalog_db::entities::{brand, product};
use catalog_db::product_filter::icontains;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info};

use crate::error::{
    api_error, bad_request, db_error, media_error, not_found, ApiResult, ErrorResponse,
    FieldErrors, Missing,
};
use crate::handlers::brands::product_counts;
use crate::handlers::{body, non_blank};
use crate::media::{read_uploads, MediaStore};
use crate::models::{AdminBrand, AdminBrandRequest, LogoUrlResponse};
use crate::query::{param, Params};
use crate::AppState;

const BRAND_LOGO_FOLDER: &str = "brands";
const NAME_MAX_LEN: usize = 150;

fn admin_brand(model: brand::Model, counts: &HashMap<i32, u64>, media: &MediaStore) -> AdminBrand {
    AdminBrand {
        products_count: counts.get(&model.id).copied().unwrap_or(0),
        logo_url: media.url_opt(model.logo.as_deref()),
        id: model.id,
        name: model.name,
        slug: model.slug,
        logo: model.logo,
        description: model.description,
        created_at: model.created_at,
    }
}

async fn find(db: &DatabaseConnection, id: i32) -> ApiResult<brand::Model> {
    brand::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Brand))
}

async fn respond(state: &AppState, model: brand::Model) -> ApiResult<AdminBrand> {
    let counts = product_counts(&state.db).await.map_err(db_error)?;
    Ok(admin_brand(model, &counts, &state.media))
}

fn validate(req: &AdminBrandRequest, creating: bool) -> ApiResult<()> {
    let mut errors = FieldErrors::new();
    if creating {
        errors.require("name", req.name.as_deref());
    } else {
        errors.not_blank("name", req.name.as_deref());
    }
    errors.max_len("name", req.name.as_deref(), NAME_MAX_LEN);
    errors.max_len(
        "slug",
        req.slug.as_ref().and_then(|s| s.as_deref()),
        brand::SLUG_MAX_LEN,
    );
    errors.into_result()
}

/// List brands by name
#[utoipa::path(
    get,
    path = "/api/admin/brands",
    params(
        ("search" = Option<String>, Query, description = "Substring of name or description")
    ),
    responses(
        (status = 200, description = "Brands", body = Vec<AdminBrand>)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Vec<AdminBrand>>> {
    debug!("Admin: listing brands");

    let mut query = brand::Entity::find().order_by_asc(brand::Column::Name);
    if let Some(term) = param(&params, "search") {
        query = query.filter(
            Condition::any()
                .add(icontains(brand::Entity, brand::Column::Name, term))
                .add(icontains(brand::Entity, brand::Column::Description, term)),
        );
    }

    let brands = query.all(&state.db).await.map_err(db_error)?;
    let counts = product_counts(&state.db).await.map_err(db_error)?;
    Ok(Json(
        brands
            .into_iter()
            .map(|b| admin_brand(b, &counts, &state.media))
            .collect(),
    ))
}

/// Create a brand
#[utoipa::path(
    post,
    path = "/api/admin/brands",
    request_body = AdminBrandRequest,
    responses(
        (status = 201, description = "Brand created", body = AdminBrand),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AdminBrandRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminBrand>)> {
    let req = body(payload)?;
    validate(&req, true)?;

    let model = brand::ActiveModel {
        name: Set(req.name.unwrap_or_default().trim().to_string()),
        slug: Set(non_blank(req.slug.flatten().as_deref()).unwrap_or_default()),
        description: Set(req.description.flatten()),
        logo: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!("Admin: created brand {} ({})", model.id, model.slug);
    Ok((StatusCode::CREATED, Json(respond(&state, model).await?)))
}

/// Get a brand
#[utoipa::path(
    get,
    path = "/api/admin/brands/{id}",
    params(
        ("id" = i32, Path, description = "Brand id")
    ),
    responses(
        (status = 200, description = "Brand", body = AdminBrand),
        (status = 404, description = "Brand not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<AdminBrand>> {
    let model = find(&state.db, id).await?;
    Ok(Json(respond(&state, model).await?))
}

/// Update a brand
#[utoipa::path(
    put,
    path = "/api/admin/brands/{id}",
    params(
        ("id" = i32, Path, description = "Brand id")
    ),
    request_body = AdminBrandRequest,
    responses(
        (status = 200, description = "Brand updated", body = AdminBrand),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Brand not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<AdminBrandRequest>, JsonRejection>,
) -> ApiResult<Json<AdminBrand>> {
    let existing = find(&state.db, id).await?;
    let req = body(payload)?;
    validate(&req, false)?;

    let mut active: brand::ActiveModel = existing.into();
    if let Some(name) = req.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(slug) = non_blank(req.slug.flatten().as_deref()) {
        active.slug = Set(slug);
    }
    if let Some(description) = req.description {
        active.description = Set(description);
    }
    let model = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin: updated brand {}", model.id);
    Ok(Json(respond(&state, model).await?))
}

/// Delete a brand that no product refers to
#[utoipa::path(
    delete,
    path = "/api/admin/brands/{id}",
    params(
        ("id" = i32, Path, description = "Brand id")
    ),
    responses(
        (status = 204, description = "Brand deleted"),
        (status = 404, description = "Brand not found", body = ErrorResponse),
        (status = 409, description = "Brand still has products", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let model = find(&state.db, id).await?;
    let in_use = product::Entity::find()
        .filter(product::Column::BrandId.eq(id))
        .count(&state.db)
        .await
        .map_err(db_error)?;
    if in_use > 0 {
        return Err(api_error(
            StatusCode::CONFLICT,
            "BRAND_IN_USE",
            format!("Нельзя удалить бренд: к нему привязано товаров: {}", in_use),
        ));
    }

    let logo = model.logo.clone();
    model.delete(&state.db).await.map_err(db_error)?;
    if let Some(logo) = logo {
        state.media.remove(&logo).await;
    }

    info!("Admin: deleted brand {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the brand logo
#[utoipa::path(
    post,
    path = "/api/admin/brands/{id}/upload-logo",
    params(
        ("id" = i32, Path, description = "Brand id")
    ),
    request_body(content_type = "multipart/form-data", description = "A `logo` file field"),
    responses(
        (status = 200, description = "Logo stored", body = LogoUrlResponse),
        (status = 400, description = "No logo provided", body = ErrorResponse),
        (status = 404, description = "Brand not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-catalog"
)]
pub async fn upload_logo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> ApiResult<Json<LogoUrlResponse>> {
    let model = find(&state.db, id).await?;
    let upload = read_uploads(&mut multipart, &["logo"])
        .await
        .map_err(media_error)?
        .into_iter()
        .next()
        .ok_or_else(|| bad_request("NO_LOGO", "No logo provided"))?;

    let path = state
        .media
        .save(BRAND_LOGO_FOLDER, &upload)
        .await
        .map_err(media_error)?;
    let previous = model.logo.clone();

    let mut active: brand::ActiveModel = model.into();
    active.logo = Set(Some(path));
    let model = active.update(&state.db).await.map_err(db_error)?;
    if let Some(previous) = previous {
        state.media.remove(&previous).await;
    }

    info!("Admin: new logo for brand {}", id);
    Ok(Json(LogoUrlResponse {
        logo: state.media.url_opt(model.logo.as_deref()),
    }))
}
