use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use crate::state::AppState;

/// Builds the full router. Handlers only see upstream providers through
/// `AppState`, so tests can swap the identity and store adapters for
/// in-memory ones.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(protected_routes(state.clone()))
        .merge(assistant_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use crate::middleware::auth::bearer_auth_middleware;
    use handlers::{auth, tasks};

    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route("/api/tasks/:id", put(tasks::update).delete(tasks::delete))
        .layer(from_fn_with_state(state, bearer_auth_middleware))
}

fn assistant_routes() -> Router<AppState> {
    use handlers::{chat, news, weather};

    Router::new()
        .route("/api/chat", post(chat::chat))
        .route("/api/tasks/suggest", post(chat::suggest))
        .route("/api/weather/:city", get(weather::current))
        .route("/api/news", get(news::headlines))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "MindSync API", "status": "running" }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
