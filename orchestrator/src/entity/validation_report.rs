use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "validation_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub migration_id: Uuid,
    /// One of: row_count, checksum, data_integrity.
    pub validation_type: String,
    /// JSON text: figures observed on the source side.
    pub source_result: String,
    /// JSON text: figures observed on the target side.
    pub target_result: String,
    pub is_valid: bool,
    /// JSON text array of mismatch descriptions.
    pub discrepancies: String,
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
