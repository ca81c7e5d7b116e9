use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::application::{ReplyOutcome, Source};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub outcome: ReplyOutcome,
    pub sources: Vec<Source>,
}

/// One chat turn. Always 200: failures come back as a fallback answer.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let reply = state.chat.reply(&request.message).await;

    Json(ChatResponse {
        answer: reply.text,
        outcome: reply.outcome,
        sources: reply.sources,
    })
}
