use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_category() -> String {
    "technology".to_string()
}

fn default_limit() -> u32 {
    5
}

/// GET /api/news - Top headlines for a category
pub async fn headlines(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<Value>, ApiError> {
    let articles = state
        .news
        .top_headlines(&query.category, query.limit)
        .await
        .map_err(|err| ApiError::internal_server_error(err.to_string()))?;

    Ok(Json(json!({ "articles": articles })))
}
