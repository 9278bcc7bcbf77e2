//! Stored event listing endpoint.

use axum::extract::State;
use axum::Json;

use proxwatch_core::PredictionEvent;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/v1/events`
///
/// All stored prediction events in insertion order. Live-map consumers
/// fetch this once on load, then follow `/ws` for updates.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PredictionEvent>>, ApiError> {
    Ok(Json(state.service.events()?))
}
