use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Migrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Migrations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Migrations::Name).string().not_null())
                    .col(ColumnDef::new(Migrations::Description).string().null())
                    .col(
                        ColumnDef::new(Migrations::SourceDbType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Migrations::TargetDbType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Migrations::SourceConfig).text().not_null())
                    .col(ColumnDef::new(Migrations::TargetConfig).text().not_null())
                    .col(
                        ColumnDef::new(Migrations::MigrationType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Migrations::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Migrations::ProgressPercentage)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Migrations::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Migrations::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Migrations::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_migrations_created_by")
                            .from(Migrations::Table, Migrations::CreatedBy)
                            .to(ServiceUser::Table, ServiceUser::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_migrations_created_at")
                    .table(Migrations::Table)
                    .col(Migrations::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Migrations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Migrations {
    Table,
    Id,
    Name,
    Description,
    SourceDbType,
    TargetDbType,
    SourceConfig,
    TargetConfig,
    MigrationType,
    Status,
    ProgressPercentage,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ServiceUser {
    Table,
    Id,
}
