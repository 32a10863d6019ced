use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ValidationReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ValidationReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ValidationReports::MigrationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValidationReports::ValidationType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValidationReports::SourceResult)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValidationReports::TargetResult)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValidationReports::IsValid)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ValidationReports::Discrepancies)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(ValidationReports::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_validation_reports_migration")
                            .from(ValidationReports::Table, ValidationReports::MigrationId)
                            .to(Migrations::Table, Migrations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_validation_reports_migration")
                    .table(ValidationReports::Table)
                    .col(ValidationReports::MigrationId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ValidationReports::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ValidationReports {
    Table,
    Id,
    MigrationId,
    ValidationType,
    SourceResult,
    TargetResult,
    IsValid,
    Discrepancies,
    CreatedAt,
}

#[derive(Iden)]
enum Migrations {
    Table,
    Id,
}
