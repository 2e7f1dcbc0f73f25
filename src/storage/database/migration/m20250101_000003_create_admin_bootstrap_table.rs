use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminBootstrap::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminBootstrap::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminBootstrap::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(AdminBootstrap::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminBootstrap::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AdminBootstrap {
    Table,
    Id,
    UserId,
    CreatedAt,
}
