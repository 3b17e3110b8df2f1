//! Catalog schema: categories, brands, products and their vocabularies

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// `decimal(25,2)` where the backend has it. SQLite stores prices as REAL,
/// which is how the driver binds and reads decimals there anyway.
fn price_column(backend: sea_orm::DbBackend) -> ColumnDef {
    match backend {
        sea_orm::DbBackend::Sqlite => double_null(Products::Price),
        _ => decimal_len_null(Products::Price, 25, 2),
    }
}

fn created_at<T: IntoIden>(col: T) -> ColumnDef {
    timestamp_with_time_zone(col)
        .default(Expr::current_timestamp())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. categories (self-referencing forest)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(string_len(Categories::Name, 200))
                    .col(string_len_uniq(Categories::Slug, 200))
                    .col(integer_null(Categories::ParentId))
                    .col(string_len_null(Categories::Image, 255))
                    .col(integer(Categories::SortOrder).default(0))
                    .col(created_at(Categories::CreatedAt))
                    .col(created_at(Categories::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_categories_parent_id")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_categories_parent_id")
                    .table(Categories::Table)
                    .col(Categories::ParentId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. brands
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Brands::Table)
                    .if_not_exists()
                    .col(pk_auto(Brands::Id))
                    .col(string_len_uniq(Brands::Name, 150))
                    .col(string_len_uniq(Brands::Slug, 160))
                    .col(string_len_null(Brands::Logo, 255))
                    .col(text_null(Brands::Description))
                    .col(created_at(Brands::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. products
        // ============================================================
        let backend = manager.get_database_backend();
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(string_len(Products::Name, 200))
                    .col(string_len_uniq(Products::Slug, 200))
                    .col(integer_null(Products::BrandId))
                    .col(text(Products::Description).default(""))
                    .col(integer(Products::CategoryId))
                    .col(price_column(backend))
                    .col(boolean(Products::IsAvailable).default(true))
                    .col(string_len_null(Products::ManufacturerSku, 100))
                    .col(string_len_null(Products::InternalSku, 100).unique_key())
                    .col(created_at(Products::CreatedAt))
                    .col(created_at(Products::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_category_id")
                            .from(Products::Table, Products::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_brand_id")
                            .from(Products::Table, Products::BrandId)
                            .to(Brands::Table, Brands::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("idx_products_category_id", Products::CategoryId),
            ("idx_products_brand_id", Products::BrandId),
            ("idx_products_created_at", Products::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Products::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        // ============================================================
        // 4. features, feature_values, product_features
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Features::Table)
                    .if_not_exists()
                    .col(pk_auto(Features::Id))
                    .col(string_len_uniq(Features::Name, 100))
                    .col(integer(Features::CategoryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_features_category_id")
                            .from(Features::Table, Features::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FeatureValues::Table)
                    .if_not_exists()
                    .col(pk_auto(FeatureValues::Id))
                    .col(integer_null(FeatureValues::CategoryId))
                    .col(integer_null(FeatureValues::FeatureId))
                    .col(string_len(FeatureValues::Value, 255))
                    .col(created_at(FeatureValues::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feature_values_category_id")
                            .from(FeatureValues::Table, FeatureValues::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feature_values_feature_id")
                            .from(FeatureValues::Table, FeatureValues::FeatureId)
                            .to(Features::Table, Features::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_feature_values_category_value")
                    .table(FeatureValues::Table)
                    .col(FeatureValues::CategoryId)
                    .col(FeatureValues::Value)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductFeatures::Table)
                    .if_not_exists()
                    .col(pk_auto(ProductFeatures::Id))
                    .col(integer(ProductFeatures::ProductId))
                    .col(integer_null(ProductFeatures::FeatureId))
                    .col(integer_null(ProductFeatures::ValueId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_features_product_id")
                            .from(ProductFeatures::Table, ProductFeatures::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_features_feature_id")
                            .from(ProductFeatures::Table, ProductFeatures::FeatureId)
                            .to(Features::Table, Features::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_features_value_id")
                            .from(ProductFeatures::Table, ProductFeatures::ValueId)
                            .to(FeatureValues::Table, FeatureValues::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_product_features_product_id")
                    .table(ProductFeatures::Table)
                    .col(ProductFeatures::ProductId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. tags, tag_names, product_tag_groups (+ link table)
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(pk_auto(Tags::Id))
                    .col(string_len_uniq(Tags::Name, 100))
                    .col(string_len_uniq(Tags::Slug, 120))
                    .col(integer_null(Tags::CategoryId))
                    .col(created_at(Tags::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tags_category_id")
                            .from(Tags::Table, Tags::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TagNames::Table)
                    .if_not_exists()
                    .col(pk_auto(TagNames::Id))
                    .col(string_len_uniq(TagNames::Name, 100))
                    .col(integer_null(TagNames::CategoryId))
                    .col(created_at(TagNames::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tag_names_category_id")
                            .from(TagNames::Table, TagNames::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductTagGroups::Table)
                    .if_not_exists()
                    .col(pk_auto(ProductTagGroups::Id))
                    .col(integer(ProductTagGroups::ProductId))
                    .col(integer_null(ProductTagGroups::GroupNameId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_tag_groups_product_id")
                            .from(ProductTagGroups::Table, ProductTagGroups::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_tag_groups_group_name_id")
                            .from(ProductTagGroups::Table, ProductTagGroups::GroupNameId)
                            .to(TagNames::Table, TagNames::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductTagGroupTags::Table)
                    .if_not_exists()
                    .col(integer(ProductTagGroupTags::ProductTagGroupId))
                    .col(integer(ProductTagGroupTags::TagId))
                    .primary_key(
                        Index::create()
                            .col(ProductTagGroupTags::ProductTagGroupId)
                            .col(ProductTagGroupTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_tag_group_tags_group_id")
                            .from(
                                ProductTagGroupTags::Table,
                                ProductTagGroupTags::ProductTagGroupId,
                            )
                            .to(ProductTagGroups::Table, ProductTagGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_tag_group_tags_tag_id")
                            .from(ProductTagGroupTags::Table, ProductTagGroupTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 6. images
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Images::Table)
                    .if_not_exists()
                    .col(pk_auto(Images::Id))
                    .col(integer(Images::ProductId))
                    .col(string_len_null(Images::Image, 255))
                    .col(boolean(Images::IsMain).default(false))
                    .col(integer(Images::SortOrder).default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_images_product_id")
                            .from(Images::Table, Images::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_images_product_id")
                    .table(Images::Table)
                    .col(Images::ProductId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Images::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductTagGroupTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductTagGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TagNames::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductFeatures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FeatureValues::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Features::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Brands::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Slug,
    ParentId,
    Image,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Brands {
    Table,
    Id,
    Name,
    Slug,
    Logo,
    Description,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Products {
    Table,
    Id,
    Name,
    Slug,
    BrandId,
    Description,
    CategoryId,
    Price,
    IsAvailable,
    ManufacturerSku,
    InternalSku,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Features {
    Table,
    Id,
    Name,
    CategoryId,
}

#[derive(DeriveIden)]
enum FeatureValues {
    Table,
    Id,
    CategoryId,
    FeatureId,
    Value,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProductFeatures {
    Table,
    Id,
    ProductId,
    FeatureId,
    ValueId,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Name,
    Slug,
    CategoryId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TagNames {
    Table,
    Id,
    Name,
    CategoryId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProductTagGroups {
    Table,
    Id,
    ProductId,
    GroupNameId,
}

#[derive(DeriveIden)]
enum ProductTagGroupTags {
    Table,
    ProductTagGroupId,
    TagId,
}

#[derive(DeriveIden)]
enum Images {
    Table,
    Id,
    ProductId,
    Image,
    IsMain,
    SortOrder,
}
