use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
pub struct SearchFaqsRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FaqHitResponse {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub score: f32,
}

pub async fn search_faqs(
    State(state): State<AppState>,
    Json(request): Json<SearchFaqsRequest>,
) -> Result<Json<Vec<FaqHitResponse>>, StatusCode> {
    let top_k = request.limit.unwrap_or_else(|| state.rag.default_top_k());

    let result = state
        .rag
        .retrieve(&request.query, top_k)
        .await
        .map_err(|e| match e {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::EmptyStore => StatusCode::CONFLICT,
            DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            e => {
                tracing::error!(error = %e, "search failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    Ok(Json(
        result
            .into_hits()
            .into_iter()
            .map(|hit| FaqHitResponse {
                id: hit.document.id,
                question: hit.document.metadata.question,
                answer: hit.document.metadata.answer,
                category: hit.document.metadata.category,
                score: hit.score,
            })
            .collect(),
    ))
}
