use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// A submitted migration. Rows are inserted on submission and mutated by the
/// scripted progress runner; this code path never deletes them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "migrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub source_db_type: String,
    pub target_db_type: String,
    /// JSON text: source connection params with secrets sealed (see crypto).
    pub source_config: String,
    /// JSON text: target connection params with secrets sealed.
    pub target_config: String,
    /// One of: full, incremental, schema_only, data_only.
    pub migration_type: String,
    /// One of: pending, running, completed, failed.
    pub status: String,
    pub progress_percentage: i32,
    pub created_by: Uuid,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service_user::Entity",
        from = "Column::CreatedBy",
        to = "super::service_user::Column::Id"
    )]
    ServiceUser,
    #[sea_orm(has_many = "super::migration_log::Entity")]
    MigrationLog,
    #[sea_orm(has_many = "super::validation_report::Entity")]
    ValidationReport,
}

impl Related<super::service_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceUser.def()
    }
}

impl Related<super::migration_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MigrationLog.def()
    }
}

impl Related<super::validation_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ValidationReport.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
