use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MigrationLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MigrationLogs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MigrationLogs::MigrationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MigrationLogs::Level).string().not_null())
                    .col(ColumnDef::new(MigrationLogs::Message).string().not_null())
                    .col(ColumnDef::new(MigrationLogs::Details).text().null())
                    .col(
                        ColumnDef::new(MigrationLogs::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_migration_logs_migration")
                            .from(MigrationLogs::Table, MigrationLogs::MigrationId)
                            .to(Migrations::Table, Migrations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_migration_logs_migration")
                    .table(MigrationLogs::Table)
                    .col(MigrationLogs::MigrationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MigrationLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MigrationLogs {
    Table,
    Id,
    MigrationId,
    Level,
    Message,
    Details,
    CreatedAt,
}

#[derive(Iden)]
enum Migrations {
    Table,
    Id,
}
