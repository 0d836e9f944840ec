use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::chat::service::{self, DEFAULT_SESSION_ID};
use crate::errors::AppError;
use crate::resume::payload::ResumePayload;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
    pub resume_data: Option<ResumePayload>,
}

#[derive(Debug, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub status: &'static str,
    pub data: ChatAnswer,
}

/// POST /chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Message is required".to_string()))?;
    let session_id = req
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());

    let answer = service::chat(&state, &session_id, &message, req.resume_data).await?;

    Ok(Json(ChatResponse {
        status: "success",
        data: ChatAnswer { answer },
    }))
}
