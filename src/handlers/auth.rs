use axum::{extract::State, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/signup - Create a new account
///
/// When the provider defers confirmation and no elevated key is configured,
/// `access_token` is null and the message points at email verification.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state.identity.signup(&payload.email, &payload.password).await?;

    Ok(Json(json!({
        "message": outcome.message,
        "user": outcome.user,
        "access_token": outcome.access_token,
    })))
}

/// POST /api/auth/login - Password login, returns the session token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state.identity.login(&payload.email, &payload.password).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "user": outcome.user,
        "access_token": outcome.access_token,
    })))
}

/// GET /api/auth/me - Identity bound to the presented token
pub async fn me(Extension(user): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "user": { "id": user.id, "email": user.email }
    }))
}
