pub use sea_orm_migration::prelude::*;

mod m20260805_000001_create_service_users;
mod m20260805_000002_create_migrations;
mod m20260805_000003_create_migration_logs;
mod m20260806_000004_create_validation_reports;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260805_000001_create_service_users::Migration),
            Box::new(m20260805_000002_create_migrations::Migration),
            Box::new(m20260805_000003_create_migration_logs::Migration),
            Box::new(m20260806_000004_create_validation_reports::Migration),
        ]
    }
}
