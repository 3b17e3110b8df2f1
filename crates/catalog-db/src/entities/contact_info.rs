//! Shop contact details. At most one row may exist.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::singleton::ensure_vacant;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub phone: String,

    pub email: String,

    #[sea_orm(column_type = "Text")]
    pub address: String,

    pub map_url: Option<String>,

    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            ensure_vacant::<Entity, C>(db).await?;
        }
        self.updated_at = Set(chrono::Utc::now());
        Ok(self)
    }
}
