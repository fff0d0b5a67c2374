//! Precompute routes: trigger, lookups, and the sync-all repair pass.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::error;

use gradpath_core::Error;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/precompute", post(trigger_precompute))
        .route(
            "/precompute/recommendations/{id}",
            get(get_recommendation),
        )
        .route("/precompute/jobs", get(get_jobs))
        .route("/precompute/sync-all", post(sync_all))
}

#[derive(Debug, Deserialize)]
struct TriggerRequest {
    #[serde(default)]
    student_id: String,
    #[serde(default)]
    is_simulation: bool,
    episodes: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SyncAllQuery {
    #[serde(default)]
    is_simulation: bool,
}

/// POST /api/precompute — queue a job, reply before it runs.
async fn trigger_precompute(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TriggerRequest>,
) -> impl IntoResponse {
    match state
        .orchestrator
        .trigger(&body.student_id, body.is_simulation, body.episodes)
    {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "job_id": job_id, "status": "queued" })),
        ),
        Err(e) => error_response(e),
    }
}

/// GET /api/precompute/recommendations/:id — fetch a stored recommendation.
async fn get_recommendation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.get_recommendation(&id) {
        Ok(recommendation) => (StatusCode::OK, Json(serde_json::json!(recommendation))),
        Err(e) => error_response(e),
    }
}

/// GET /api/precompute/jobs — most recent jobs, newest first.
async fn get_jobs(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.orchestrator.get_job_status() {
        Ok(jobs) => {
            let total = jobs.len();
            (
                StatusCode::OK,
                Json(serde_json::json!({ "jobs": jobs, "total": total })),
            )
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/precompute/sync-all?is_simulation= — run a reconciliation pass.
async fn sync_all(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SyncAllQuery>,
) -> impl IntoResponse {
    match state.orchestrator.sync_all(query.is_simulation).await {
        Ok(report) => (StatusCode::OK, Json(serde_json::json!(report))),
        Err(e) => error_response(e),
    }
}

fn error_response(e: Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        _ => {
            error!("Request failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(serde_json::json!({ "error": e.to_string() })))
}
