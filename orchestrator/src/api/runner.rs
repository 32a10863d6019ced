//! Scripted migration progress.
//!
//! A real run does not move any data: it plays a fixed seven-step script,
//! one step per interval, appending a log row and bumping the stored
//! progress percentage each time. The registry tracks the active run per
//! migration so it can be observed over SSE and cancelled.

use std::collections::HashMap;
use std::time::Instant;

use axum::response::sse::Event;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::entity::{migration_log, migration_run};

use super::AppState;
use super::dto::MigrationStatus;

/// The fixed step script. Step i (1-based) reports progress i * 100 / 7.
pub const PROGRESS_STEPS: [&str; 7] = [
    "Connecting to source database",
    "Analyzing source schema",
    "Creating target schema",
    "Transferring table data",
    "Migrating indexes and constraints",
    "Running post-transfer checks",
    "Migration completed successfully",
];

// ---------- SSE event type ----------

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    Log { level: String, message: String },
    Progress { percent: i32 },
    Completed,
    Cancelled,
    Failed { message: String },
}

impl RunEvent {
    pub fn to_sse_event(&self) -> Result<Event, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(Event::default().data(json))
    }
}

// ---------- run registry ----------

pub struct ProgressRun {
    pub migration_id: Uuid,
    pub tx: broadcast::Sender<RunEvent>,
    pub cancel: CancellationToken,
    pub started_at: Instant,
}

impl ProgressRun {
    pub fn new(migration_id: Uuid) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            migration_id,
            tx,
            cancel: CancellationToken::new(),
            started_at: Instant::now(),
        }
    }
}

/// Active runs, one per migration. Finished runs are removed by the runner
/// task itself.
#[derive(Default)]
pub struct RunStore {
    active: HashMap<Uuid, ProgressRun>,
}

impl RunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a run. Fails when one is already active for the migration.
    pub fn try_register(&mut self, run: ProgressRun) -> Result<(), ()> {
        if self.active.contains_key(&run.migration_id) {
            return Err(());
        }
        self.active.insert(run.migration_id, run);
        Ok(())
    }

    pub fn remove(&mut self, migration_id: Uuid) {
        self.active.remove(&migration_id);
    }

    pub fn is_active(&self, migration_id: Uuid) -> bool {
        self.active.contains_key(&migration_id)
    }

    /// Get a broadcast receiver for a running migration.
    pub fn subscribe(&self, migration_id: Uuid) -> Option<broadcast::Receiver<RunEvent>> {
        self.active.get(&migration_id).map(|r| r.tx.subscribe())
    }

    /// Trigger cancellation (returns false when no run is active). The
    /// runner task observes the token, marks the row failed, and deregisters.
    pub fn cancel(&self, migration_id: Uuid) -> bool {
        match self.active.get(&migration_id) {
            Some(run) => {
                run.cancel.cancel();
                true
            }
            None => false,
        }
    }
}

// ---------- persistence helpers ----------

/// Append one migration_logs row.
pub async fn append_log(
    db: &DatabaseConnection,
    migration_id: Uuid,
    level: &str,
    message: &str,
    details: Option<serde_json::Value>,
) -> Result<(), sea_orm::DbErr> {
    let details = details.map(|v| v.to_string());
    migration_log::ActiveModel {
        id: Set(Uuid::now_v7()),
        migration_id: Set(migration_id),
        level: Set(level.to_string()),
        message: Set(message.to_string()),
        details: Set(details),
        created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await?;
    Ok(())
}

async fn set_progress(
    db: &DatabaseConnection,
    migration_id: Uuid,
    percent: i32,
    status: Option<MigrationStatus>,
) -> Result<(), sea_orm::DbErr> {
    let mut active = migration_run::ActiveModel {
        id: Set(migration_id),
        progress_percentage: Set(percent),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    if let Some(status) = status {
        active.status = Set(status.as_str().to_string());
    }
    active.update(db).await?;
    Ok(())
}

// ---------- the runner ----------

/// Play the progress script for one migration. Runs inside a spawned task;
/// the submit handler has already registered the run and responded.
pub async fn run_scripted(state: AppState, migration_id: Uuid) {
    let (tx, cancel) = {
        let store = state.run_store.lock().await;
        match store.active.get(&migration_id) {
            Some(run) => (run.tx.clone(), run.cancel.clone()),
            None => return,
        }
    };

    let send = |event: RunEvent| {
        let _ = tx.send(event);
    };

    let total = PROGRESS_STEPS.len() as i32;
    for (i, message) in PROGRESS_STEPS.iter().enumerate() {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(migration_id = %migration_id, "run cancelled");
                finish_cancelled(&state, migration_id, &send).await;
                return;
            }
            _ = tokio::time::sleep(state.step_interval) => {}
        }

        let step = i as i32 + 1;
        let percent = step * 100 / total;
        let is_last = step == total;

        let result = async {
            append_log(
                &state.db,
                migration_id,
                "info",
                message,
                Some(serde_json::json!({ "step": step, "totalSteps": total })),
            )
            .await?;
            set_progress(
                &state.db,
                migration_id,
                percent,
                is_last.then_some(MigrationStatus::Completed),
            )
            .await
        }
        .await;

        if let Err(e) = result {
            tracing::error!(migration_id = %migration_id, error = %e, "progress step failed");
            let _ = set_progress(&state.db, migration_id, percent, Some(MigrationStatus::Failed))
                .await;
            send(RunEvent::Failed {
                message: e.to_string(),
            });
            state.run_store.lock().await.remove(migration_id);
            return;
        }

        send(RunEvent::Log {
            level: "info".to_string(),
            message: message.to_string(),
        });
        send(RunEvent::Progress { percent });
    }

    send(RunEvent::Completed);
    state.run_store.lock().await.remove(migration_id);
    tracing::info!(migration_id = %migration_id, "run completed");
}

async fn finish_cancelled(state: &AppState, migration_id: Uuid, send: &impl Fn(RunEvent)) {
    if let Err(e) = append_log(
        &state.db,
        migration_id,
        "warning",
        "Migration cancelled by user",
        None,
    )
    .await
    {
        tracing::error!(migration_id = %migration_id, error = %e, "failed to log cancellation");
    }
    let mark_failed = migration_run::ActiveModel {
        id: Set(migration_id),
        status: Set(MigrationStatus::Failed.as_str().to_string()),
        updated_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    if let Err(e) = mark_failed.update(&state.db).await {
        tracing::error!(migration_id = %migration_id, error = %e, "failed to mark cancelled run");
    }
    send(RunEvent::Cancelled);
    state.run_store.lock().await.remove(migration_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Auth;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ColumnTrait, Database, EntityTrait, QueryFilter};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    async fn setup() -> AppState {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        AppState {
            auth: Arc::new(Auth::new(db.clone())),
            db,
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 1,
            master_key: [42u8; 32],
            run_store: Arc::new(Mutex::new(RunStore::new())),
            step_interval: Duration::from_millis(1),
        }
    }

    async fn insert_running_migration(state: &AppState) -> Uuid {
        let user = state
            .auth
            .create_user("runner-test", "pw", false)
            .await
            .unwrap();
        let now = Utc::now().naive_utc();
        let id = Uuid::now_v7();
        migration_run::ActiveModel {
            id: Set(id),
            name: Set("orders".to_string()),
            description: Set(None),
            source_db_type: Set("postgresql".to_string()),
            target_db_type: Set("mysql".to_string()),
            source_config: Set("{}".to_string()),
            target_config: Set("{}".to_string()),
            migration_type: Set("full".to_string()),
            status: Set(MigrationStatus::Running.as_str().to_string()),
            progress_percentage: Set(0),
            created_by: Set(user.id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&state.db)
        .await
        .unwrap();
        id
    }

    async fn register(state: &AppState, id: Uuid) {
        state
            .run_store
            .lock()
            .await
            .try_register(ProgressRun::new(id))
            .unwrap();
    }

    #[tokio::test]
    async fn test_script_completes_migration() {
        let state = setup().await;
        let id = insert_running_migration(&state).await;
        register(&state, id).await;

        run_scripted(state.clone(), id).await;

        let row = migration_run::Entity::find_by_id(id)
            .one(&state.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, "completed");
        assert_eq!(row.progress_percentage, 100);

        let logs = migration_log::Entity::find()
            .filter(migration_log::Column::MigrationId.eq(id))
            .all(&state.db)
            .await
            .unwrap();
        assert_eq!(logs.len(), PROGRESS_STEPS.len());
        assert!(!state.run_store.lock().await.is_active(id));
    }

    #[tokio::test]
    async fn test_progress_increments_are_sevenths() {
        // Step i must report i * 100 / 7.
        let expected: Vec<i32> = (1..=7).map(|i| i * 100 / 7).collect();
        assert_eq!(expected, vec![14, 28, 42, 57, 71, 85, 100]);
    }

    #[tokio::test]
    async fn test_cancelled_run_marks_failed() {
        let state = setup().await;
        let id = insert_running_migration(&state).await;
        register(&state, id).await;

        assert!(state.run_store.lock().await.cancel(id));
        run_scripted(state.clone(), id).await;

        let row = migration_run::Entity::find_by_id(id)
            .one(&state.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, "failed");

        let logs = migration_log::Entity::find()
            .filter(migration_log::Column::MigrationId.eq(id))
            .all(&state.db)
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level, "warning");
        assert!(!state.run_store.lock().await.is_active(id));
    }

    #[tokio::test]
    async fn test_one_active_run_per_migration() {
        let state = setup().await;
        let id = Uuid::now_v7();
        register(&state, id).await;

        let mut store = state.run_store.lock().await;
        assert!(store.try_register(ProgressRun::new(id)).is_err());
        store.remove(id);
        assert!(store.try_register(ProgressRun::new(id)).is_ok());
    }

    #[tokio::test]
    async fn test_cancel_without_active_run_is_noop() {
        let state = setup().await;
        assert!(!state.run_store.lock().await.cancel(Uuid::now_v7()));
    }

    #[tokio::test]
    async fn test_subscribers_see_completion() {
        let state = setup().await;
        let id = insert_running_migration(&state).await;
        register(&state, id).await;

        let mut rx = state.run_store.lock().await.subscribe(id).unwrap();
        run_scripted(state.clone(), id).await;

        let mut saw_completed = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, RunEvent::Completed) {
                saw_completed = true;
            }
        }
        assert!(saw_completed, "subscriber should observe Completed");
    }
}
