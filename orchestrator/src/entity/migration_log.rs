use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// Append-only log line attached to a migration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "migration_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub migration_id: Uuid,
    /// One of: info, warning, error.
    pub level: String,
    pub message: String,
    /// JSON text with structured extras (scores, step numbers, ...).
    pub details: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::migration_run::Entity",
        from = "Column::MigrationId",
        to = "super::migration_run::Column::Id"
    )]
    MigrationRun,
}

impl Related<super::migration_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MigrationRun.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
