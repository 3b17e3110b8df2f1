//! Product entity

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::slug::fill_slug;

pub const SLUG_MAX_LEN: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(unique)]
    pub slug: String,

    pub brand_id: Option<i32>,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub category_id: i32,

    #[sea_orm(column_type = "Decimal(Some((25, 2)))", nullable)]
    pub price: Option<Decimal>,

    pub is_available: bool,

    /// SKU as printed by the manufacturer
    pub manufacturer_sku: Option<String>,

    /// System-generated SKU, `<prefix>-<4 digits>`; unique once assigned
    #[sea_orm(unique)]
    pub internal_sku: Option<String>,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Category,

    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Brand,

    #[sea_orm(has_many = "super::image::Entity")]
    Images,

    #[sea_orm(has_many = "super::product_feature::Entity")]
    Features,

    #[sea_orm(has_many = "super::product_tag_group::Entity")]
    TagGroups,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl Related<super::image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::product_feature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Features.def()
    }
}

impl Related<super::product_tag_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TagGroups.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();
        if insert {
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
            if self.is_available.is_not_set() {
                self.is_available = Set(true);
            }
        }
        self.updated_at = Set(now);
        fill_slug(&mut self.slug, &self.name, SLUG_MAX_LEN);
        Ok(self)
    }
}
