use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use catalog_db::entities::news_item;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};
use tracing::debug;

use crate::error::{db_error, not_found, ApiResult, ErrorResponse, Missing};
use crate::models::{NewsDetail, NewsListItem};
use crate::pagination::{fetch_page, parse_limit, Page, PageRequest};
use crate::query::Params;
use crate::AppState;

fn published() -> Select<news_item::Entity> {
    news_item::Entity::find()
        .filter(news_item::Column::IsPublished.eq(true))
        .order_by_desc(news_item::Column::PubDate)
        .order_by_desc(news_item::Column::Id)
}

fn list_item(model: news_item::Model) -> NewsListItem {
    NewsListItem {
        id: model.id,
        title: model.title,
        slug: model.slug,
        preview: model.preview,
        image: model.image,
        pub_date: model.pub_date,
    }
}

/// List published news, newest first
#[utoipa::path(
    get,
    path = "/api/news",
    params(
        ("page" = Option<u64>, Query, description = "Page number"),
        ("page_size" = Option<u64>, Query, description = "Items per page (max 100)"),
        ("limit" = Option<u64>, Query, description = "Only consider the newest N items")
    ),
    responses(
        (status = 200, description = "News", body = Page<NewsListItem>),
        (status = 404, description = "Invalid page", body = ErrorResponse)
    ),
    tag = "news"
)]
pub async fn list_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Page<NewsListItem>>> {
    debug!("Listing news");

    let request = PageRequest::from_params(&params)?;
    let page = match parse_limit(&params) {
        // The limit cuts the list before pagination
        Some(limit) => {
            let items = published()
                .limit(limit)
                .all(&state.db)
                .await
                .map_err(db_error)?;
            request.slice(items)?
        }
        None => fetch_page(&state.db, published(), request).await?,
    };

    Ok(Json(page.map(list_item)))
}

/// Get a published news item by slug
#[utoipa::path(
    get,
    path = "/api/news/{slug}",
    params(
        ("slug" = String, Path, description = "News slug")
    ),
    responses(
        (status = 200, description = "News item", body = NewsDetail),
        (status = 404, description = "News item not found", body = ErrorResponse)
    ),
    tag = "news"
)]
pub async fn get_news(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<NewsDetail>> {
    debug!("Getting news item: {}", slug);

    let item = published()
        .filter(news_item::Column::Slug.eq(slug))
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::News))?;

    Ok(Json(NewsDetail {
        id: item.id,
        title: item.title,
        slug: item.slug,
        content: item.content,
        preview: item.preview,
        image: item.image,
        pub_date: item.pub_date,
    }))
}
