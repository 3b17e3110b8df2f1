use std::{cmp::Reverse, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    Json,
};
use catalog_db::entities::{product_tag_group_tag, tag};
use sea_orm::sea_query::Expr;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect};
use tracing::debug;

use crate::assemble::tag_item;
use crate::error::{db_error, not_found, ApiResult, ErrorResponse, Missing};
use crate::models::{TagItem, TagWithCount};
use crate::AppState;

/// List all tags by name
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "Tags", body = Vec<TagItem>)
    ),
    tag = "tags"
)]
pub async fn list_tags(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<TagItem>>> {
    debug!("Listing tags");

    let tags = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    Ok(Json(tags.iter().map(tag_item).collect()))
}

/// Get a tag by id
#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    params(
        ("id" = i32, Path, description = "Tag id")
    ),
    responses(
        (status = 200, description = "Tag", body = TagItem),
        (status = 404, description = "Tag not found", body = ErrorResponse)
    ),
    tag = "tags"
)]
pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<TagItem>> {
    debug!("Getting tag: {}", id);

    let tag = tag::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| not_found(Missing::Tag))?;

    Ok(Json(tag_item(&tag)))
}

/// Tags with the number of product tag groups using each, most used first
#[utoipa::path(
    get,
    path = "/api/tags/with-count",
    responses(
        (status = 200, description = "Tags with usage counts", body = Vec<TagWithCount>)
    ),
    tag = "tags"
)]
pub async fn tags_with_count(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TagWithCount>>> {
    debug!("Listing tags with usage counts");

    let usage: Vec<(i32, i64)> = product_tag_group_tag::Entity::find()
        .select_only()
        .column(product_tag_group_tag::Column::TagId)
        .column_as(
            Expr::col(product_tag_group_tag::Column::ProductTagGroupId).count(),
            "uses",
        )
        .group_by(product_tag_group_tag::Column::TagId)
        .into_tuple()
        .all(&state.db)
        .await
        .map_err(db_error)?;
    let usage: HashMap<i32, u64> = usage
        .into_iter()
        .map(|(id, count)| (id, count.max(0) as u64))
        .collect();

    let tags = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(&state.db)
        .await
        .map_err(db_error)?;

    let mut items: Vec<TagWithCount> = tags
        .into_iter()
        .map(|t| TagWithCount {
            count: usage.get(&t.id).copied().unwrap_or(0),
            id: t.id,
            name: t.name,
            slug: t.slug,
        })
        .collect();
    items.sort_by_key(|item| Reverse(item.count));

    Ok(Json(items))
}
