use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::assistant::{AssistantError, ChatTurn};
use crate::state::AppState;

use super::tasks::TaskPayload;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
}

/// POST /api/chat - Assistant reply for a chat message plus recent history
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<Value>, ApiError> {
    let response = state
        .assistant
        .generate_response(&payload.message, &payload.conversation_history)
        .await
        .map_err(assistant_error)?;

    Ok(Json(json!({
        "response": response,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// POST /api/tasks/suggest - Suggestions for tackling a task
pub async fn suggest(
    State(state): State<AppState>,
    Json(task): Json<TaskPayload>,
) -> Result<Json<Value>, ApiError> {
    let suggestions = state
        .assistant
        .task_suggestions(&task.title, task.description.as_deref())
        .await
        .map_err(assistant_error)?;

    Ok(Json(json!({ "suggestions": suggestions, "task": task })))
}

fn assistant_error(err: AssistantError) -> ApiError {
    tracing::error!("assistant request failed: {}", err);
    ApiError::internal_server_error(err.to_string())
}
