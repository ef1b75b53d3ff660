use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::error::ApiError;
use crate::services::weather::WeatherReport;
use crate::state::AppState;

/// GET /api/weather/:city - Current conditions for a city
pub async fn current(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<WeatherReport>, ApiError> {
    let report = state
        .weather
        .current(&city)
        .await
        .map_err(|err| ApiError::internal_server_error(err.to_string()))?;

    Ok(Json(report))
}
