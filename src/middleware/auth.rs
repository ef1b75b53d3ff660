use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::services::identity::UserIdentity;
use crate::state::AppState;

/// Authenticated user context resolved from the bearer token, injected into
/// request extensions for protected handlers.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl From<UserIdentity> for AuthUser {
    fn from(identity: UserIdentity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
        }
    }
}

/// Bearer authentication middleware. Rejects before any handler (and thus any
/// store access) runs: missing or malformed credentials are 401
/// "Not authenticated", unresolvable tokens are 401 "Invalid token".
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_from_headers(&headers)?;

    // Every request pays the resolution round trip; tokens are opaque here
    // and only the provider can bind one to an identity.
    let identity = state
        .identity
        .resolve(&token)
        .await
        .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;

    request.extensions_mut().insert(AuthUser::from(identity));
    Ok(next.run(request).await)
}

fn extract_bearer_from_headers(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Not authenticated"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        _ => Err(ApiError::unauthorized("Not authenticated")),
    }
}
