//! Health Check API Handler

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::api::AppState;

/// GET /health
/// Liveness plus the number of jobs waiting for or held by the worker
pub async fn health_check(State(manager): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "outstanding_jobs": manager.outstanding(),
    }))
}
