use axum::{
    Router,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::set_header::response::SetResponseHeaderLayer;

use crate::auth::Auth;

pub mod auth_handlers;
pub mod dto;
pub mod jwt;
pub mod orchestrator_handlers;
pub mod runner;
pub mod validation_handlers;

// ---------- shared state ----------

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub master_key: [u8; 32],
    /// In-memory registry of active scripted progress runs.
    pub run_store: Arc<Mutex<runner::RunStore>>,
    /// Delay between scripted progress steps (shortened in tests).
    pub step_interval: Duration,
}

// ---------- error type ----------

/// A JSON error response: `{"error": "..."}` with an HTTP status.
///
/// The dashboard contract reports every request failure — bad input, unknown
/// ids, missing auth — as 400; 500 is reserved for store and serialization
/// faults.
pub struct ApiErr(StatusCode, String);

impl ApiErr {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self(StatusCode::BAD_REQUEST, format!("Unauthorized: {}", msg.into()))
    }

    pub fn internal(e: impl std::fmt::Display) -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.1 });
        (self.0, Json(body)).into_response()
    }
}

// ---------- router ----------

pub fn api_router(state: AppState) -> Router {
    // The dashboard may be served from anywhere; the API is token-gated.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/me", get(auth_handlers::me))
        .route(
            "/migration-orchestrator",
            post(orchestrator_handlers::submit).get(orchestrator_handlers::status),
        )
        .route(
            "/migration-orchestrator/{id}/logs",
            get(orchestrator_handlers::logs),
        )
        .route(
            "/migration-orchestrator/{id}/events",
            get(orchestrator_handlers::events),
        )
        .route(
            "/migration-orchestrator/{id}/run",
            delete(orchestrator_handlers::cancel_run),
        )
        .route(
            "/validation-service",
            post(validation_handlers::validate).get(validation_handlers::list_reports),
        )
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .with_state(state)
}
