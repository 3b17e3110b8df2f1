//! Content schema: news, about page, contact details and contact messages

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NewsItems::Table)
                    .if_not_exists()
                    .col(pk_auto(NewsItems::Id))
                    .col(string_len(NewsItems::Title, 200))
                    .col(string_len_uniq(NewsItems::Slug, 200))
                    .col(text(NewsItems::Content))
                    .col(text(NewsItems::Preview))
                    .col(string_len(NewsItems::Image, 500).default(""))
                    .col(timestamp_with_time_zone(NewsItems::PubDate).default(Expr::current_timestamp()))
                    .col(boolean(NewsItems::IsPublished).default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_news_items_pub_date")
                    .table(NewsItems::Table)
                    .col(NewsItems::PubDate)
                    .to_owned(),
            )
            .await?;

        // Single-row tables; the one-row rule lives in the save hooks
        manager
            .create_table(
                Table::create()
                    .table(AboutContent::Table)
                    .if_not_exists()
                    .col(pk_auto(AboutContent::Id))
                    .col(string_len(AboutContent::Title, 200))
                    .col(text(AboutContent::Content))
                    .col(string_len(AboutContent::Image, 500).default(""))
                    .col(timestamp_with_time_zone(AboutContent::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContactInfo::Table)
                    .if_not_exists()
                    .col(pk_auto(ContactInfo::Id))
                    .col(string_len(ContactInfo::Phone, 50))
                    .col(string_len(ContactInfo::Email, 254))
                    .col(text(ContactInfo::Address))
                    .col(string_len_null(ContactInfo::MapUrl, 500))
                    .col(timestamp_with_time_zone(ContactInfo::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContactMessages::Table)
                    .if_not_exists()
                    .col(pk_auto(ContactMessages::Id))
                    .col(string_len(ContactMessages::Name, 100))
                    .col(string_len(ContactMessages::Email, 254))
                    .col(text(ContactMessages::Message))
                    .col(timestamp_with_time_zone(ContactMessages::CreatedAt).default(Expr::current_timestamp()))
                    .col(boolean(ContactMessages::IsProcessed).default(false))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContactMessages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContactInfo::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AboutContent::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NewsItems::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum NewsItems {
    Table,
    Id,
    Title,
    Slug,
    Content,
    Preview,
    Image,
    PubDate,
    IsPublished,
}

#[derive(DeriveIden)]
enum AboutContent {
    Table,
    Id,
    Title,
    Content,
    Image,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ContactInfo {
    Table,
    Id,
    Phone,
    Email,
    Address,
    MapUrl,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ContactMessages {
    Table,
    Id,
    Name,
    Email,
    Message,
    CreatedAt,
    IsProcessed,
}
