use std::sync::Arc;

use axum::{extract::State, Json};
use catalog_db::entities::{brand, category, contact_message, feature, news_item, product, tag};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tracing::debug;

use crate::error::{db_error, ApiResult};
use crate::models::StatsResponse;
use crate::AppState;

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Counters", body = StatsResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatsResponse>> {
    debug!("Computing dashboard stats");
    let db = &state.db;

    Ok(Json(StatsResponse {
        products_count: product::Entity::find().count(db).await.map_err(db_error)?,
        categories_count: category::Entity::find().count(db).await.map_err(db_error)?,
        brands_count: brand::Entity::find().count(db).await.map_err(db_error)?,
        news_count: news_item::Entity::find().count(db).await.map_err(db_error)?,
        published_news_count: news_item::Entity::find()
            .filter(news_item::Column::IsPublished.eq(true))
            .count(db)
            .await
            .map_err(db_error)?,
        unread_messages: contact_message::Entity::find()
            .filter(contact_message::Column::IsProcessed.eq(false))
            .count(db)
            .await
            .map_err(db_error)?,
        total_messages: contact_message::Entity::find()
            .count(db)
            .await
            .map_err(db_error)?,
        available_products: product::Entity::find()
            .filter(product::Column::IsAvailable.eq(true))
            .count(db)
            .await
            .map_err(db_error)?,
        tags_count: tag::Entity::find().count(db).await.map_err(db_error)?,
        features_count: feature::Entity::find().count(db).await.map_err(db_error)?,
    }))
}
