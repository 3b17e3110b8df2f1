use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use catalog_db::entities::news_item;
use catalog_db::product_filter::icontains;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info};

use crate::error::{db_error, not_found, ApiResult, ErrorResponse, FieldErrors, Missing};
use crate::handlers::{body, non_blank};
use crate::models::{AdminNews, AdminNewsRequest};
use crate::query::{param, Params};
use crate::AppState;

const TITLE_MAX_LEN: usize = 200;
const PREVIEW_MAX_LEN: usize = 500;

fn admin_news(model: news_item::Model) -> AdminNews {
    AdminNews {
        id: model.id,
        title: model.title,
        slug: model.slug,
        preview: model.preview,
        content: model.content,
        image: model.image,
        pub_date: model.pub_date,
        is_published: model.is_published,
    }
}

async fn find(db: &DatabaseConnection, id: i32) -> ApiResult<news_item::Model> {
    news_item::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::News))
}

fn validate(req: &AdminNewsRequest, creating: bool) -> ApiResult<()> {
    let mut errors = FieldErrors::new();
    if creating {
        errors.require("title", req.title.as_deref());
        errors.require("content", req.content.as_deref());
        errors.require("preview", req.preview.as_deref());
    } else {
        errors.not_blank("title", req.title.as_deref());
        errors.not_blank("content", req.content.as_deref());
        errors.not_blank("preview", req.preview.as_deref());
    }
    errors.max_len("title", req.title.as_deref(), TITLE_MAX_LEN);
    errors.max_len("preview", req.preview.as_deref(), PREVIEW_MAX_LEN);
    errors.max_len(
        "slug",
        req.slug.as_ref().and_then(|s| s.as_deref()),
        news_item::SLUG_MAX_LEN,
    );
    errors.into_result()
}

/// List news, newest first, published or not
#[utoipa::path(
    get,
    path = "/api/admin/news",
    params(
        ("search" = Option<String>, Query, description = "Substring of title or content"),
        ("is_published" = Option<String>, Query, description = "`true` for published, anything else for drafts")
    ),
    responses(
        (status = 200, description = "News", body = Vec<AdminNews>)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Vec<AdminNews>>> {
    debug!("Admin: listing news");

    let mut query = news_item::Entity::find()
        .order_by_desc(news_item::Column::PubDate)
        .order_by_desc(news_item::Column::Id);
    if let Some(term) = param(&params, "search") {
        query = query.filter(
            Condition::any()
                .add(icontains(news_item::Entity, news_item::Column::Title, term))
                .add(icontains(news_item::Entity, news_item::Column::Content, term)),
        );
    }
    if let Some(flag) = params.get("is_published") {
        let wanted = flag.trim().eq_ignore_ascii_case("true");
        query = query.filter(news_item::Column::IsPublished.eq(wanted));
    }

    let items = query.all(&state.db).await.map_err(db_error)?;
    Ok(Json(items.into_iter().map(admin_news).collect()))
}

/// Create a news item
#[utoipa::path(
    post,
    path = "/api/admin/news",
    request_body = AdminNewsRequest,
    responses(
        (status = 201, description = "News item created", body = AdminNews),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AdminNewsRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AdminNews>)> {
    let req = body(payload)?;
    validate(&req, true)?;

    let mut active = news_item::ActiveModel {
        title: Set(req.title.unwrap_or_default().trim().to_string()),
        slug: Set(non_blank(req.slug.flatten().as_deref()).unwrap_or_default()),
        preview: Set(req.preview.unwrap_or_default()),
        content: Set(req.content.unwrap_or_default()),
        image: Set(req.image.unwrap_or_default()),
        ..Default::default()
    };
    if let Some(is_published) = req.is_published {
        active.is_published = Set(is_published);
    }
    let model = active.insert(&state.db).await.map_err(db_error)?;

    info!("Admin: created news item {} ({})", model.id, model.slug);
    Ok((StatusCode::CREATED, Json(admin_news(model))))
}

/// Get a news item
#[utoipa::path(
    get,
    path = "/api/admin/news/{id}",
    params(("id" = i32, Path, description = "News item id")),
    responses(
        (status = 200, description = "News item", body = AdminNews),
        (status = 404, description = "News item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<AdminNews>> {
    Ok(Json(admin_news(find(&state.db, id).await?)))
}

/// Update a news item
#[utoipa::path(
    put,
    path = "/api/admin/news/{id}",
    params(("id" = i32, Path, description = "News item id")),
    request_body = AdminNewsRequest,
    responses(
        (status = 200, description = "News item updated", body = AdminNews),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "News item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    payload: Result<Json<AdminNewsRequest>, JsonRejection>,
) -> ApiResult<Json<AdminNews>> {
    let existing = find(&state.db, id).await?;
    let req = body(payload)?;
    validate(&req, false)?;

    let mut active: news_item::ActiveModel = existing.into();
    if let Some(title) = req.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(slug) = non_blank(req.slug.flatten().as_deref()) {
        active.slug = Set(slug);
    }
    if let Some(preview) = req.preview {
        active.preview = Set(preview);
    }
    if let Some(content) = req.content {
        active.content = Set(content);
    }
    if let Some(image) = req.image {
        active.image = Set(image);
    }
    if let Some(is_published) = req.is_published {
        active.is_published = Set(is_published);
    }
    let model = active.update(&state.db).await.map_err(db_error)?;

    info!("Admin: updated news item {}", model.id);
    Ok(Json(admin_news(model)))
}

/// Delete a news item
#[utoipa::path(
    delete,
    path = "/api/admin/news/{id}",
    params(("id" = i32, Path, description = "News item id")),
    responses(
        (status = 204, description = "News item deleted"),
        (status = 404, description = "News item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin-content"
)]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    let model = find(&state.db, id).await?;
    model.delete(&state.db).await.map_err(db_error)?;
    info!("Admin: deleted news item {}", id);
    Ok(StatusCode::NO_CONTENT)
}
