//! Migration to create the listings table.
//!
//! A listing is identified by (channel_id, source_id) and is never removed
//! by normal operation; disappearance from a channel only flips `deleted`.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Listings::ChannelId).text().not_null())
                    .col(ColumnDef::new(Listings::SourceId).big_integer().not_null())
                    .col(ColumnDef::new(Listings::Kind).text().not_null())
                    .col(ColumnDef::new(Listings::District).text().null())
                    .col(ColumnDef::new(Listings::Metro).text().null())
                    .col(ColumnDef::new(Listings::Address).text().null())
                    .col(ColumnDef::new(Listings::Rooms).integer().null())
                    .col(ColumnDef::new(Listings::SizeSqm).double().null())
                    .col(ColumnDef::new(Listings::Floor).integer().null())
                    .col(ColumnDef::new(Listings::TotalFloors).integer().null())
                    .col(ColumnDef::new(Listings::Price).big_integer().null())
                    .col(ColumnDef::new(Listings::Pets).text().null())
                    .col(ColumnDef::new(Listings::Tenants).text().null())
                    .col(ColumnDef::new(Listings::Features).json_binary().not_null())
                    .col(
                        ColumnDef::new(Listings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Listings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Listings::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_listings")
                            .col(Listings::ChannelId)
                            .col(Listings::SourceId),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for the tombstone delta: active ids per channel.
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_channel_deleted")
                    .table(Listings::Table)
                    .col(Listings::ChannelId)
                    .col(Listings::Deleted)
                    .to_owned(),
            )
            .await?;

        // Index for search: newest non-deleted listings of a kind, using raw SQL
        // for the DESC ordering.
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "CREATE INDEX IF NOT EXISTS idx_listings_kind_created ON listings (kind, deleted, created_at DESC)".to_string(),
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_listings_channel_deleted")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_listings_kind_created").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Listings {
    Table,
    ChannelId,
    SourceId,
    Kind,
    District,
    Metro,
    Address,
    Rooms,
    SizeSqm,
    Floor,
    TotalFloors,
    Price,
    Pets,
    Tenants,
    Features,
    CreatedAt,
    UpdatedAt,
    Deleted,
}
