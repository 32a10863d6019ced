use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto;
use crate::entity::{migration_log, migration_run, service_user, validation_report};
use crate::scoring::ScoringInput;

use super::ApiErr;

// ---------- auth ----------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub last_login_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl From<service_user::Model> for UserResponse {
    fn from(m: service_user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            is_admin: m.is_admin,
            is_active: m.is_active,
            last_login_at: m.last_login_at,
            created_at: m.created_at,
        }
    }
}

// ---------- migration submission ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationType {
    Full,
    Incremental,
    SchemaOnly,
    DataOnly,
}

impl MigrationType {
    pub fn as_str(self) -> &'static str {
        match self {
            MigrationType::Full => "full",
            MigrationType::Incremental => "incremental",
            MigrationType::SchemaOnly => "schema_only",
            MigrationType::DataOnly => "data_only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl MigrationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MigrationStatus::Pending => "pending",
            MigrationStatus::Running => "running",
            MigrationStatus::Completed => "completed",
            MigrationStatus::Failed => "failed",
        }
    }
}

/// One side of the migration. `type` is the engine; scoring hints are
/// optional; any other fields (host, port, username, password, ...) ride
/// along untyped and are sealed before storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointConfig {
    #[serde(rename = "type")]
    pub db_type: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub estimated_tables: u32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_json_fields: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_blob_fields: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationOptions {
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default)]
    pub enable_validation: bool,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_batch_size() -> u32 {
    1000
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            enable_validation: false,
            dry_run: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRequest {
    pub name: String,
    pub description: Option<String>,
    pub source_config: EndpointConfig,
    pub target_config: EndpointConfig,
    pub migration_type: MigrationType,
    #[serde(default)]
    pub options: MigrationOptions,
}

impl MigrationRequest {
    pub fn scoring_input(&self) -> ScoringInput {
        ScoringInput {
            source_type: self.source_config.db_type.clone(),
            target_type: self.target_config.db_type.clone(),
            estimated_tables: self.source_config.estimated_tables,
            has_json_fields: self.source_config.has_json_fields,
            has_blob_fields: self.source_config.has_blob_fields,
        }
    }
}

// ---------- migration responses ----------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResponse {
    pub migration_id: Uuid,
    pub dry_run: bool,
    pub complexity_score: u8,
    pub estimated_time: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedResponse {
    pub migration_id: Uuid,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub source_db_type: String,
    pub target_db_type: String,
    /// Stored config with sealed secrets stripped.
    pub source_config: serde_json::Value,
    pub target_config: serde_json::Value,
    pub migration_type: String,
    pub status: String,
    pub progress_percentage: i32,
    pub created_by: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl MigrationResponse {
    pub fn from_model(m: migration_run::Model) -> Result<Self, ApiErr> {
        let source_config: serde_json::Value =
            serde_json::from_str(&m.source_config).map_err(ApiErr::internal)?;
        let target_config: serde_json::Value =
            serde_json::from_str(&m.target_config).map_err(ApiErr::internal)?;
        Ok(Self {
            id: m.id,
            name: m.name,
            description: m.description,
            source_db_type: m.source_db_type,
            target_db_type: m.target_db_type,
            source_config: crypto::redact_config(source_config),
            target_config: crypto::redact_config(target_config),
            migration_type: m.migration_type,
            status: m.status,
            progress_percentage: m.progress_percentage,
            created_by: m.created_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogResponse {
    pub id: Uuid,
    pub migration_id: Uuid,
    pub level: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
}

impl LogResponse {
    pub fn from_model(m: migration_log::Model) -> Result<Self, ApiErr> {
        let details = match m.details {
            Some(ref s) => Some(serde_json::from_str(s).map_err(ApiErr::internal)?),
            None => None,
        };
        Ok(Self {
            id: m.id,
            migration_id: m.migration_id,
            level: m.level,
            message: m.message,
            details,
            created_at: m.created_at,
        })
    }
}

// ---------- validation ----------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub migration_id: Uuid,
    pub validation_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    pub migration_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReportResponse {
    pub id: Uuid,
    pub migration_id: Uuid,
    pub validation_type: String,
    pub source_result: serde_json::Value,
    pub target_result: serde_json::Value,
    pub is_valid: bool,
    pub discrepancies: serde_json::Value,
    pub created_at: NaiveDateTime,
}

impl ValidationReportResponse {
    pub fn from_model(m: validation_report::Model) -> Result<Self, ApiErr> {
        Ok(Self {
            id: m.id,
            migration_id: m.migration_id,
            validation_type: m.validation_type,
            source_result: serde_json::from_str(&m.source_result).map_err(ApiErr::internal)?,
            target_result: serde_json::from_str(&m.target_result).map_err(ApiErr::internal)?,
            is_valid: m.is_valid,
            discrepancies: serde_json::from_str(&m.discrepancies).map_err(ApiErr::internal)?,
            created_at: m.created_at,
        })
    }
}
