use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub documents: usize,
    pub skipped_records: usize,
    pub failed_embeddings: usize,
    pub embedding_model: String,
    pub built_at: DateTime<Utc>,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// The server only starts after the index is built, so reaching this handler
/// means the pipeline is ready; the body summarizes the build.
pub async fn readiness_check(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let report = &state.report;
    Json(ReadinessResponse {
        status: "ready".into(),
        documents: report.store_size(),
        skipped_records: report.skipped_records(),
        failed_embeddings: report.failed().len(),
        embedding_model: report.embedding_model().to_string(),
        built_at: report.built_at(),
    })
}
