use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::tasks::{default_priority, NewTask, TaskFields};
use crate::state::AppState;

/// Task fields a client may set. Any extra fields in the request body
/// (including `id` and `user_id`) are dropped on deserialization; ownership
/// comes only from the authenticated identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_priority")]
    pub priority: String,
}

/// GET /api/tasks - All tasks owned by the authenticated user
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let tasks = state.tasks.list(Some(&user.id)).await?;
    Ok(Json(json!({ "tasks": tasks })))
}

/// POST /api/tasks - Create a task owned by the authenticated user
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Value>, ApiError> {
    let record = NewTask {
        title: payload.title,
        description: payload.description,
        completed: payload.completed,
        priority: payload.priority,
        user_id: user.id,
    };

    let task = state.tasks.create(record).await?;
    Ok(Json(json!({ "message": "Task created", "task": task })))
}

/// PUT /api/tasks/:id - Replace a task's fields wholesale
///
/// TODO: scope the write to the requesting owner once the sharing model is
/// settled; today any authenticated user can update any task by id.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(_user): Extension<AuthUser>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<Value>, ApiError> {
    let fields = TaskFields {
        title: payload.title,
        description: payload.description,
        completed: payload.completed,
        priority: payload.priority,
    };

    let task = state
        .tasks
        .update(&id, fields)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))?;

    Ok(Json(json!({ "message": "Task updated", "task": task })))
}

/// DELETE /api/tasks/:id - Remove a task
///
/// TODO: same owner-scoping question as `update`.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    if !state.tasks.delete(&id).await? {
        return Err(ApiError::not_found("Task not found"));
    }
    Ok(Json(json!({ "message": "Task deleted" })))
}
