use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Json, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::crypto;
use crate::entity::{migration_log, migration_run};
use crate::scoring;

use super::dto::{
    DryRunResponse, LogResponse, MigrationRequest, MigrationResponse, MigrationStatus,
    StartedResponse, StatusQuery,
};
use super::jwt::AuthClaims;
use super::runner::{self, ProgressRun};
use super::{ApiErr, AppState};

// ---------- POST /migration-orchestrator ----------

pub async fn submit(
    AuthClaims(claims): AuthClaims,
    State(state): State<AppState>,
    Json(body): Json<MigrationRequest>,
) -> Result<Response, ApiErr> {
    let dry_run = body.options.dry_run;

    let source_config = serde_json::to_value(&body.source_config).map_err(ApiErr::internal)?;
    let target_config = serde_json::to_value(&body.target_config).map_err(ApiErr::internal)?;
    let source_config =
        crypto::seal_config(source_config, &state.master_key).map_err(ApiErr::internal)?;
    let target_config =
        crypto::seal_config(target_config, &state.master_key).map_err(ApiErr::internal)?;

    let status = if dry_run {
        MigrationStatus::Pending
    } else {
        MigrationStatus::Running
    };

    let now = Utc::now().naive_utc();
    let migration_id = Uuid::now_v7();

    migration_run::ActiveModel {
        id: Set(migration_id),
        name: Set(body.name.clone()),
        description: Set(body.description.clone()),
        source_db_type: Set(body.source_config.db_type.clone()),
        target_db_type: Set(body.target_config.db_type.clone()),
        source_config: Set(source_config.to_string()),
        target_config: Set(target_config.to_string()),
        migration_type: Set(body.migration_type.as_str().to_string()),
        status: Set(status.as_str().to_string()),
        progress_percentage: Set(0),
        created_by: Set(claims.sub),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await
    .map_err(ApiErr::internal)?;

    runner::append_log(
        &state.db,
        migration_id,
        "info",
        &format!("Migration '{}' submitted", body.name),
        Some(serde_json::json!({
            "migrationType": body.migration_type.as_str(),
            "dryRun": dry_run,
            "batchSize": body.options.batch_size,
        })),
    )
    .await
    .map_err(ApiErr::internal)?;

    tracing::info!(
        migration_id = %migration_id,
        user = %claims.username,
        dry_run,
        "migration submitted"
    );

    if dry_run {
        let analysis = scoring::analyze(&body.scoring_input());
        runner::append_log(
            &state.db,
            migration_id,
            "info",
            "Dry run analysis completed",
            Some(serde_json::json!({
                "complexityScore": analysis.complexity_score,
                "estimatedTime": analysis.estimated_time,
                "recommendations": analysis.recommendations,
            })),
        )
        .await
        .map_err(ApiErr::internal)?;

        return Ok(Json(DryRunResponse {
            migration_id,
            dry_run: true,
            complexity_score: analysis.complexity_score,
            estimated_time: analysis.estimated_time,
            recommendations: analysis.recommendations,
        })
        .into_response());
    }

    // Real run: register the scripted runner and respond without waiting.
    {
        let mut store = state.run_store.lock().await;
        store
            .try_register(ProgressRun::new(migration_id))
            .map_err(|_| ApiErr::internal("run already active for this migration"))?;
    }

    let run_state = state.clone();
    tokio::spawn(async move {
        runner::run_scripted(run_state, migration_id).await;
    });

    Ok(Json(StartedResponse {
        migration_id,
        status: "started",
    })
    .into_response())
}

// ---------- GET /migration-orchestrator ----------

/// One row when `id` is given (JSON `null` for an unknown id, never an
/// error), otherwise every row newest-first.
pub async fn status(
    AuthClaims(_): AuthClaims,
    State(state): State<AppState>,
    Query(params): Query<StatusQuery>,
) -> Result<Json<serde_json::Value>, ApiErr> {
    match params.id {
        Some(id) => {
            let row = migration_run::Entity::find_by_id(id)
                .one(&state.db)
                .await
                .map_err(ApiErr::internal)?;
            let response = row.map(MigrationResponse::from_model).transpose()?;
            Ok(Json(serde_json::to_value(response).map_err(ApiErr::internal)?))
        }
        None => {
            let rows = migration_run::Entity::find()
                .order_by_desc(migration_run::Column::CreatedAt)
                .all(&state.db)
                .await
                .map_err(ApiErr::internal)?;
            let responses = rows
                .into_iter()
                .map(MigrationResponse::from_model)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Json(serde_json::to_value(responses).map_err(ApiErr::internal)?))
        }
    }
}

// ---------- GET /migration-orchestrator/{id}/logs ----------

pub async fn logs(
    AuthClaims(_): AuthClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LogResponse>>, ApiErr> {
    migration_run::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(ApiErr::internal)?
        .ok_or_else(|| ApiErr::bad_request("Migration not found"))?;

    let rows = migration_log::Entity::find()
        .filter(migration_log::Column::MigrationId.eq(id))
        .order_by_asc(migration_log::Column::CreatedAt)
        .all(&state.db)
        .await
        .map_err(ApiErr::internal)?;

    let responses = rows
        .into_iter()
        .map(LogResponse::from_model)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(responses))
}

// ---------- GET /migration-orchestrator/{id}/events — SSE stream ----------

pub async fn events(
    AuthClaims(_): AuthClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, ApiErr> {
    let rx = {
        let store = state.run_store.lock().await;
        store
            .subscribe(id)
            .ok_or_else(|| ApiErr::bad_request("No active run for this migration"))?
    };

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        match result {
            Ok(event) => {
                let sse_event = event.to_sse_event().ok()?;
                Some(Ok(sse_event))
            }
            Err(_) => None, // lagged — skip
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    ))
}

// ---------- DELETE /migration-orchestrator/{id}/run — cancel ----------

pub async fn cancel_run(
    AuthClaims(_): AuthClaims,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiErr> {
    let cancelled = state.run_store.lock().await.cancel(id);
    if cancelled {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiErr::bad_request("No active run for this migration"))
    }
}
