//! Admin CRUD for the per-category vocabularies: tags, tag names,
//! features and feature values.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use catalog_db::entities::{category, feature, feature_value, tag, tag_name};
use catalog_db::product_filter::icontains;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info};

use crate::assemble::tag_item;
use crate::error::{db_error, not_found, ApiResult, ErrorResponse, FieldErrors, Missing};
use crate::handlers::{body, non_blank};
use crate::models::{
    AdminFeature, AdminFeatureValue, AdminTag, AdminTagName, TagItem, VocabularyRequest,
};
use crate::query::{id_param, param, Params};
use crate::AppState;

use super::category_names;

const TAG_NAME_MAX_LEN: usize = 100;
const FEATURE_NAME_MAX_LEN: usize = 200;
const FEATURE_VALUE_MAX_LEN: usize = 500;

/// Common checks: the label and an optional category reference
async fn validate(
    db: &DatabaseConnection,
    req: &VocabularyRequest,
    creating: bool,
    label: &str,
    max_len: usize,
) -> ApiResult<FieldErrors> {
    let mut errors = FieldErrors::new();
    if creating {
        errors.require(label, req.name.as_deref());
    } else {
        errors.not_blank(label, req.name.as_deref());
    }
    errors.max_len(label, req.name.as_deref(), max_len);

    if let Some(Some(category_id)) = req.category {
        let found = category::Entity::find_by_id(category_id)
            .one(db)
            .await
            .map_err(db_error)?;
        if found.is_none() {
            errors.missing_ref("category", category_id);
        }
    }
    Ok(errors)
}

fn category_filter(params: &Params) -> Option<i32> {
    id_param(params, "category")
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

async fn admin_tags(db: &DatabaseConnection, tags: Vec<tag::Model>) -> ApiResult<Vec<AdminTag>> {
    let names = category_names(db, tags.iter().filter_map(|t| t.category_id))
        .await
        .map_err(db_error)?;
    Ok(tags
        .into_iter()
        .map(|t| AdminTag {
            category_name: t.category_id.and_then(|id| names.get(&id).cloned()),
            id: t.id,
            name: t.name,
            slug: t.slug,
            category: t.category_id,
        })
        .collect())
}

async fn admin_tag(db: &DatabaseConnection, model: tag::Model) -> ApiResult<AdminTag> {
    let mut items = admin_tags(db, vec![model]).await?;
    items.pop().ok_or_else(|| not_found(Missing::Tag))
}

async fn find_tag(db: &DatabaseConnection, id: i32) -> ApiResult<tag::Model> {
    tag::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Tag))
}

/// List tags
#[utoipa::path(
    get,
    path = "/api/admin/tags",
    params(
        ("search" = Option<String>, Query, description = "Substring of the name"),
        ("category" = Option<i32>, Query, description = "Category id")
    ),
    responses(
        (status = 200, description = "Tags", body = Vec<AdminTag>)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Vec<AdminTag>>> {
    debug!("Admin: listing tags");

    let mut query = tag::Entity::find().order_by_asc(tag::Column::Name);
    if let Some(term) = param(&params, "search") {
        query = query.filter(icontains(tag::Entity, tag::Column::Name, term));
    }
    if let Some(category_id) = category_filter(&params) {
        query = query.filter(tag::Column::CategoryId.eq(category_id));
    }

    let tags = query.all(&state.db).await.map_err(db_error)?;
    Ok(Json(admin_tags(&state.db, tags).await?))
}

/// Create a tag
#[utoipa::path(
    post,
    path = "/api/admin/tags",
    request_body = VocabularyRequest,
    responses(
        (status = 201, description = "Tag created", body = AdminTag),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VocabularyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminTag>)> {
    let req = body(payload)?;
    let mut errors = validate(&state.db, &req, true, "name", TAG_NAME_MAX_LEN).await?;
    errors.max_len("slug", req.slug.as_ref().and_then(|s| s.as_deref()), tag::SLUG_MAX_LEN);
    errors.into_result()?;

    let model = tag::ActiveModel {
        name: Set(req.name.unwrap_or_default().trim().to_string()),
        slug: Set(non_blank(req.slug.flatten().as_deref()).unwrap_or_default()),
        category_id: Set(req.category.flatten()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!("Admin: created tag {} ({})", model.id, model.slug);
    Ok((StatusCode::CREATED, Json(admin_tag(&state.db, model).await?)))
}

/// Get a tag
#[utoipa::path(
    get,
    path = "/api/admin/tags/{id}",
    params(("id" = i32, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag", body = AdminTag),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<AdminTag>> {
    let model = find_tag(&state.db, id).await?;
    Ok(Json(admin_tag(&state.db, model).await?))
}

/// Update a tag
#[utoipa::path(
    put,
    path = "/api/admin/tags/{id}",
    params(("id" = i32, Path, description = "Tag id")),
    request_body = VocabularyRequest,
    responses(
        (status = 200, description = "Tag updated", body = AdminTag),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<VocabularyRequest>, JsonRejection>,
) -> ApiResult<Json<AdminTag>> {
    let existing = find_tag(&state.db, id).await?;
    let req = body(payload)?;
    let mut errors = validate(&state.db, &req, false, "name", TAG_NAME_MAX_LEN).await?;
    errors.max_len("slug", req.slug.as_ref().and_then(|s| s.as_deref()), tag::SLUG_MAX_LEN);
    errors.into_result()?;

    let mut active: tag::ActiveModel = existing.into();
    if let Some(name) = req.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(slug) = non_blank(req.slug.flatten().as_deref()) {
        active.slug = Set(slug);
    }
    if let Some(category_id) = req.category {
        active.category_id = Set(category_id);
    }
    let model = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin: updated tag {}", model.id);
    Ok(Json(admin_tag(&state.db, model).await?))
}

/// Delete a tag
#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}",
    params(("id" = i32, Path, description = "Tag id")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let model = find_tag(&state.db, id).await?;
    model.delete(&state.db).await.map_err(db_error)?;
    info!("Admin: deleted tag {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Tags available to a tag name: those of the tag name's category
#[utoipa::path(
    get,
    path = "/api/admin/tags-by-tag-name/{tag_name_id}",
    params(("tag_name_id" = i32, Path, description = "Tag name id")),
    responses(
        (status = 200, description = "Tags", body = Vec<TagItem>),
        (status = 404, description = "Tag name not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn tags_by_tag_name(
    State(state): State<Arc<AppState>>,
    Path(tag_name_id): Path<i32>,
) -> ApiResult<Json<Vec<TagItem>>> {
    let name = find_tag_name(&state.db, tag_name_id).await?;
    let Some(category_id) = name.category_id else {
        return Ok(Json(Vec::new()));
    };

    let tags = tag::Entity::find()
        .filter(tag::Column::CategoryId.eq(category_id))
        .order_by_asc(tag::Column::Name)
        .all(&state.db)
        .await
        .map_err(db_error)?;
    Ok(Json(tags.iter().map(tag_item).collect()))
}

// ---------------------------------------------------------------------------
// Tag names
// ---------------------------------------------------------------------------

async fn admin_tag_names(
    db: &DatabaseConnection,
    names: Vec<tag_name::Model>,
) -> ApiResult<Vec<AdminTagName>> {
    let categories = category_names(db, names.iter().filter_map(|n| n.category_id))
        .await
        .map_err(db_error)?;
    Ok(names
        .into_iter()
        .map(|n| AdminTagName {
            category_name: n.category_id.and_then(|id| categories.get(&id).cloned()),
            id: n.id,
            name: n.name,
            category: n.category_id,
            created_at: n.created_at,
        })
        .collect())
}

async fn admin_tag_name(db: &DatabaseConnection, model: tag_name::Model) -> ApiResult<AdminTagName> {
    let mut items = admin_tag_names(db, vec![model]).await?;
    items.pop().ok_or_else(|| not_found(Missing::TagName))
}

async fn find_tag_name(db: &DatabaseConnection, id: i32) -> ApiResult<tag_name::Model> {
    tag_name::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::TagName))
}

/// List tag names
#[utoipa::path(
    get,
    path = "/api/admin/tag-names",
    params(
        ("search" = Option<String>, Query, description = "Substring of the name"),
        ("category" = Option<i32>, Query, description = "Category id")
    ),
    responses(
        (status = 200, description = "Tag names", body = Vec<AdminTagName>)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn list_tag_names(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Vec<AdminTagName>>> {
    debug!("Admin: listing tag names");

    let mut query = tag_name::Entity::find().order_by_asc(tag_name::Column::Name);
    if let Some(term) = param(&params, "search") {
        query = query.filter(icontains(tag_name::Entity, tag_name::Column::Name, term));
    }
    if let Some(category_id) = category_filter(&params) {
        query = query.filter(tag_name::Column::CategoryId.eq(category_id));
    }

    let names = query.all(&state.db).await.map_err(db_error)?;
    Ok(Json(admin_tag_names(&state.db, names).await?))
}

/// Create a tag name
#[utoipa::path(
    post,
    path = "/api/admin/tag-names",
    request_body = VocabularyRequest,
    responses(
        (status = 201, description = "Tag name created", body = AdminTagName),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn create_tag_name(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VocabularyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminTagName>)> {
    let req = body(payload)?;
    validate(&state.db, &req, true, "name", TAG_NAME_MAX_LEN)
        .await?
        .into_result()?;

    let model = tag_name::ActiveModel {
        name: Set(req.name.unwrap_or_default().trim().to_string()),
        category_id: Set(req.category.flatten()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!("Admin: created tag name {}", model.id);
    Ok((StatusCode::CREATED, Json(admin_tag_name(&state.db, model).await?)))
}

/// Get a tag name
#[utoipa::path(
    get,
    path = "/api/admin/tag-names/{id}",
    params(("id" = i32, Path, description = "Tag name id")),
    responses(
        (status = 200, description = "Tag name", body = AdminTagName),
        (status = 404, description = "Tag name not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn get_tag_name(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<AdminTagName>> {
    let model = find_tag_name(&state.db, id).await?;
    Ok(Json(admin_tag_name(&state.db, model).await?))
}

/// Update a tag name
#[utoipa::path(
    put,
    path = "/api/admin/tag-names/{id}",
    params(("id" = i32, Path, description = "Tag name id")),
    request_body = VocabularyRequest,
    responses(
        (status = 200, description = "Tag name updated", body = AdminTagName),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Tag name not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn update_tag_name(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<VocabularyRequest>, JsonRejection>,
) -> ApiResult<Json<AdminTagName>> {
    let existing = find_tag_name(&state.db, id).await?;
    let req = body(payload)?;
    validate(&state.db, &req, false, "name", TAG_NAME_MAX_LEN)
        .await?
        .into_result()?;

    let mut active: tag_name::ActiveModel = existing.into();
    if let Some(name) = req.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(category_id) = req.category {
        active.category_id = Set(category_id);
    }
    let model = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin: updated tag name {}", model.id);
    Ok(Json(admin_tag_name(&state.db, model).await?))
}

/// Delete a tag name
#[utoipa::path(
    delete,
    path = "/api/admin/tag-names/{id}",
    params(("id" = i32, Path, description = "Tag name id")),
    responses(
        (status = 204, description = "Tag name deleted"),
        (status = 404, description = "Tag name not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn delete_tag_name(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let model = find_tag_name(&state.db, id).await?;
    model.delete(&state.db).await.map_err(db_error)?;
    info!("Admin: deleted tag name {}", id);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

async fn admin_features(
    db: &DatabaseConnection,
    features: Vec<feature::Model>,
) -> ApiResult<Vec<AdminFeature>> {
    let categories = category_names(db, features.iter().map(|f| f.category_id))
        .await
        .map_err(db_error)?;
    Ok(features
        .into_iter()
        .map(|f| AdminFeature {
            category_name: categories.get(&f.category_id).cloned(),
            id: f.id,
            name: f.name,
            category: f.category_id,
        })
        .collect())
}

async fn admin_feature(db: &DatabaseConnection, model: feature::Model) -> ApiResult<AdminFeature> {
    let mut items = admin_features(db, vec![model]).await?;
    items.pop().ok_or_else(|| not_found(Missing::Feature))
}

async fn find_feature(db: &DatabaseConnection, id: i32) -> ApiResult<feature::Model> {
    feature::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Feature))
}

/// List features
#[utoipa::path(
    get,
    path = "/api/admin/features",
    params(
        ("search" = Option<String>, Query, description = "Substring of the name"),
        ("category" = Option<i32>, Query, description = "Category id")
    ),
    responses(
        (status = 200, description = "Features", body = Vec<AdminFeature>)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn list_features(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Vec<AdminFeature>>> {
    debug!("Admin: listing features");

    let mut query = feature::Entity::find().order_by_asc(feature::Column::Name);
    if let Some(term) = param(&params, "search") {
        query = query.filter(icontains(feature::Entity, feature::Column::Name, term));
    }
    if let Some(category_id) = category_filter(&params) {
        query = query.filter(feature::Column::CategoryId.eq(category_id));
    }

    let features = query.all(&state.db).await.map_err(db_error)?;
    Ok(Json(admin_features(&state.db, features).await?))
}

/// Create a feature
#[utoipa::path(
    post,
    path = "/api/admin/features",
    request_body = VocabularyRequest,
    responses(
        (status = 201, description = "Feature created", body = AdminFeature),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn create_feature(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VocabularyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminFeature>)> {
    let req = body(payload)?;
    let mut errors = validate(&state.db, &req, true, "name", FEATURE_NAME_MAX_LEN).await?;
    let category_id = req.category.flatten();
    if category_id.is_none() {
        errors.add("category", crate::error::REQUIRED);
    }
    errors.into_result()?;

    let model = feature::ActiveModel {
        name: Set(req.name.unwrap_or_default().trim().to_string()),
        category_id: Set(category_id.unwrap_or_default()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!("Admin: created feature {}", model.id);
    Ok((StatusCode::CREATED, Json(admin_feature(&state.db, model).await?)))
}

/// Get a feature
#[utoipa::path(
    get,
    path = "/api/admin/features/{id}",
    params(("id" = i32, Path, description = "Feature id")),
    responses(
        (status = 200, description = "Feature", body = AdminFeature),
        (status = 404, description = "Feature not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn get_feature(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<AdminFeature>> {
    let model = find_feature(&state.db, id).await?;
    Ok(Json(admin_feature(&state.db, model).await?))
}

/// Update a feature
#[utoipa::path(
    put,
    path = "/api/admin/features/{id}",
    params(("id" = i32, Path, description = "Feature id")),
    request_body = VocabularyRequest,
    responses(
        (status = 200, description = "Feature updated", body = AdminFeature),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Feature not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn update_feature(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<VocabularyRequest>, JsonRejection>,
) -> ApiResult<Json<AdminFeature>> {
    let existing = find_feature(&state.db, id).await?;
    let req = body(payload)?;
    let mut errors = validate(&state.db, &req, false, "name", FEATURE_NAME_MAX_LEN).await?;
    if matches!(req.category, Some(None)) {
        errors.add("category", "This field may not be null.");
    }
    errors.into_result()?;

    let mut active: feature::ActiveModel = existing.into();
    if let Some(name) = req.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(Some(category_id)) = req.category {
        active.category_id = Set(category_id);
    }
    let model = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin: updated feature {}", model.id);
    Ok(Json(admin_feature(&state.db, model).await?))
}

/// Delete a feature with its values
#[utoipa::path(
    delete,
    path = "/api/admin/features/{id}",
    params(("id" = i32, Path, description = "Feature id")),
    responses(
        (status = 204, description = "Feature deleted"),
        (status = 404, description = "Feature not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn delete_feature(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let model = find_feature(&state.db, id).await?;
    model.delete(&state.db).await.map_err(db_error)?;
    info!("Admin: deleted feature {}", id);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Feature values
// ---------------------------------------------------------------------------

async fn admin_feature_values(
    db: &DatabaseConnection,
    values: Vec<feature_value::Model>,
) -> ApiResult<Vec<AdminFeatureValue>> {
    let categories = category_names(db, values.iter().filter_map(|v| v.category_id))
        .await
        .map_err(db_error)?;
    Ok(values
        .into_iter()
        .map(|v| AdminFeatureValue {
            category_name: v.category_id.and_then(|id| categories.get(&id).cloned()),
            id: v.id,
            value: v.value,
            feature: v.feature_id,
            category: v.category_id,
        })
        .collect())
}

async fn admin_feature_value(
    db: &DatabaseConnection,
    model: feature_value::Model,
) -> ApiResult<AdminFeatureValue> {
    let mut items = admin_feature_values(db, vec![model]).await?;
    items.pop().ok_or_else(|| not_found(Missing::FeatureValue))
}

async fn find_feature_value(db: &DatabaseConnection, id: i32) -> ApiResult<feature_value::Model> {
    feature_value::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::FeatureValue))
}

async fn check_feature_ref(
    db: &DatabaseConnection,
    req: &VocabularyRequest,
    errors: &mut FieldErrors,
) -> ApiResult<()> {
    if let Some(Some(feature_id)) = req.feature {
        let found = feature::Entity::find_by_id(feature_id)
            .one(db)
            .await
            .map_err(db_error)?;
        if found.is_none() {
            errors.missing_ref("feature", feature_id);
        }
    }
    Ok(())
}

/// List feature values
#[utoipa::path(
    get,
    path = "/api/admin/feature-values",
    params(
        ("search" = Option<String>, Query, description = "Substring of the value"),
        ("category" = Option<i32>, Query, description = "Category id")
    ),
    responses(
        (status = 200, description = "Feature values", body = Vec<AdminFeatureValue>)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn list_feature_values(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Vec<AdminFeatureValue>>> {
    debug!("Admin: listing feature values");

    let mut query = feature_value::Entity::find().order_by_asc(feature_value::Column::Value);
    if let Some(term) = param(&params, "search") {
        query = query.filter(icontains(
            feature_value::Entity,
            feature_value::Column::Value,
            term,
        ));
    }
    if let Some(category_id) = category_filter(&params) {
        query = query.filter(feature_value::Column::CategoryId.eq(category_id));
    }

    let values = query.all(&state.db).await.map_err(db_error)?;
    Ok(Json(admin_feature_values(&state.db, values).await?))
}

/// Create a feature value
#[utoipa::path(
    post,
    path = "/api/admin/feature-values",
    request_body = VocabularyRequest,
    responses(
        (status = 201, description = "Feature value created", body = AdminFeatureValue),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn create_feature_value(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VocabularyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminFeatureValue>)> {
    let req = body(payload)?;
    let mut errors = validate(&state.db, &req, true, "value", FEATURE_VALUE_MAX_LEN).await?;
    check_feature_ref(&state.db, &req, &mut errors).await?;
    errors.into_result()?;

    let model = feature_value::ActiveModel {
        value: Set(req.name.unwrap_or_default().trim().to_string()),
        category_id: Set(req.category.flatten()),
        feature_id: Set(req.feature.flatten()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(db_error)?;

    info!("Admin: created feature value {}", model.id);
    Ok((
        StatusCode::CREATED,
        Json(admin_feature_value(&state.db, model).await?),
    ))
}

/// Get a feature value
#[utoipa::path(
    get,
    path = "/api/admin/feature-values/{id}",
    params(("id" = i32, Path, description = "Feature value id")),
    responses(
        (status = 200, description = "Feature value", body = AdminFeatureValue),
        (status = 404, description = "Feature value not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn get_feature_value(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<AdminFeatureValue>> {
    let model = find_feature_value(&state.db, id).await?;
    Ok(Json(admin_feature_value(&state.db, model).await?))
}

/// Update a feature value
#[utoipa::path(
    put,
    path = "/api/admin/feature-values/{id}",
    params(("id" = i32, Path, description = "Feature value id")),
    request_body = VocabularyRequest,
    responses(
        (status = 200, description = "Feature value updated", body = AdminFeatureValue),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Feature value not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn update_feature_value(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<VocabularyRequest>, JsonRejection>,
) -> ApiResult<Json<AdminFeatureValue>> {
    let existing = find_feature_value(&state.db, id).await?;
    let req = body(payload)?;
    let mut errors = validate(&state.db, &req, false, "value", FEATURE_VALUE_MAX_LEN).await?;
    check_feature_ref(&state.db, &req, &mut errors).await?;
    errors.into_result()?;

    let mut active: feature_value::ActiveModel = existing.into();
    if let Some(value) = req.name {
        active.value = Set(value.trim().to_string());
    }
    if let Some(category_id) = req.category {
        active.category_id = Set(category_id);
    }
    if let Some(feature_id) = req.feature {
        active.feature_id = Set(feature_id);
    }
    let model = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin: updated feature value {}", model.id);
    Ok(Json(admin_feature_value(&state.db, model).await?))
}

/// Delete a feature value
#[utoipa::path(
    delete,
    path = "/api/admin/feature-values/{id}",
    params(("id" = i32, Path, description = "Feature value id")),
    responses(
        (status = 204, description = "Feature value deleted"),
        (status = 404, description = "Feature value not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-vocabulary"
)]
pub async fn delete_feature_value(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let model = find_feature_value(&state.db, id).await?;
    model.delete(&state.db).await.map_err(db_error)?;
    info!("Admin: deleted feature value {}", id);
    Ok(StatusCode::NO_CONTENT)
}
