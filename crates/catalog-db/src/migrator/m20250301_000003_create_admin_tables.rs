//! Admin accounts and revoked refresh tokens

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminUsers::Table)
                    .if_not_exists()
                    .col(pk_auto(AdminUsers::Id))
                    .col(string_len_uniq(AdminUsers::Username, 150))
                    .col(string_len(AdminUsers::Email, 254).default(""))
                    .col(string_len(AdminUsers::FirstName, 150).default(""))
                    .col(string_len(AdminUsers::LastName, 150).default(""))
                    .col(string_len(AdminUsers::PasswordHash, 255))
                    .col(boolean(AdminUsers::IsStaff).default(false))
                    .col(boolean(AdminUsers::IsSuperuser).default(false))
                    .col(boolean(AdminUsers::IsActive).default(true))
                    .col(
                        timestamp_with_time_zone(AdminUsers::DateJoined)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(AdminUsers::LastLogin))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RevokedTokens::Table)
                    .if_not_exists()
                    .col(string_len(RevokedTokens::Jti, 64).primary_key())
                    .col(timestamp_with_time_zone(RevokedTokens::ExpiresAt))
                    .col(
                        timestamp_with_time_zone(RevokedTokens::RevokedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_revoked_tokens_expires_at")
                    .table(RevokedTokens::Table)
                    .col(RevokedTokens::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RevokedTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdminUsers::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum AdminUsers {
    Table,
    Id,
    Username,
    Email,
    FirstName,
    LastName,
    PasswordHash,
    IsStaff,
    IsSuperuser,
    IsActive,
    DateJoined,
    LastLogin,
}

#[derive(DeriveIden)]
enum RevokedTokens {
    Table,
    Jti,
    ExpiresAt,
    RevokedAt,
}
