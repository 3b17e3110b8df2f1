//! News item entity

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::slug::fill_slug;

pub const SLUG_MAX_LEN: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "news_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(column_type = "Text")]
    pub preview: String,

    /// Image URL; empty when the item has none
    pub image: String,

    pub pub_date: ChronoDateTimeUtc,

    pub is_published: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if self.pub_date.is_not_set() {
                self.pub_date = Set(chrono::Utc::now());
            }
            if self.is_published.is_not_set() {
                self.is_published = Set(true);
            }
            if self.image.is_not_set() {
                self.image = Set(String::new());
            }
        }
        fill_slug(&mut self.slug, &self.title, SLUG_MAX_LEN);
        Ok(self)
    }
}
