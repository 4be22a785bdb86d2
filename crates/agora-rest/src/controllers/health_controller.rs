//! Health check controller.

use crate::state::AppState;
use agora_core::HealthStatus;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness response with one entry per dependency.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: BTreeMap<String, HealthStatus>,
}

/// Creates the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// 200 when no dependency is unhealthy, 503 otherwise.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks = BTreeMap::new();
    for check in &state.health_checks {
        checks.insert(check.name().to_string(), check.check().await);
    }
    let ready = checks.values().all(|s| !s.is_unhealthy());

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadinessResponse { ready, checks }))
}

pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
