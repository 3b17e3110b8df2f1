//! `/api/admin` handlers
//!
//! Every route here except login, refresh and logout sits behind
//! [`require_admin`](crate::middleware::require_admin).

pub mod auth;
pub mod brands;
pub mod categories;
pub mod content;
pub mod images;
pub mod news;
pub mod products;
pub mod stats;
pub mod vocabulary;

use catalog_db::entities::category;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::HashMap;

/// Names of the given categories, for `category_name` columns
pub(crate) async fn category_names(
    db: &DatabaseConnection,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, String>, sea_orm::DbErr> {
    let ids: Vec<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(category::Entity::find()
        .filter(category::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}
