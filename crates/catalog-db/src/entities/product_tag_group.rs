//! ProductTagGroup entity: product × tag name, with its tags in `product_tag_group_tags`

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_tag_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub product_id: i32,

    pub group_name_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Product,

    #[sea_orm(
        belongs_to = "super::tag_name::Entity",
        from = "Column::GroupNameId",
        to = "super::tag_name::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    GroupName,

    #[sea_orm(has_many = "super::product_tag_group_tag::Entity")]
    TagLinks,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::tag_name::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupName.def()
    }
}

impl Related<super::product_tag_group_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TagLinks.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_tag_group_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_tag_group_tag::Relation::Group.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
