//! Event submission endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use proxwatch_core::{Coordinate, NewEvent, Notification, PredictionEvent};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for a prediction event submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    /// Identifier of the submitting actor.
    pub actor_id: String,
    /// Display name of the submitting actor.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Opaque disease label.
    pub disease: String,
    /// Submission time; the engine assigns the current time when absent.
    pub time: Option<DateTime<Utc>>,
}

/// Response for a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    /// The stored event with assigned identity.
    pub event: PredictionEvent,
    /// Notifications created by this submission, in match order.
    pub notifications: Vec<Notification>,
}

/// `POST /api/v1/locations`
///
/// Validates the coordinate, runs the full store/match/notify pipeline,
/// and returns the stored event plus any notifications it produced.
/// Fails with 400 before any state change when the coordinate is
/// malformed.
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let coordinate = Coordinate::new(request.latitude, request.longitude)?;

    let submission = state.service.submit(
        NewEvent {
            actor_id: request.actor_id,
            actor_name: request.name,
            coordinate,
            disease: request.disease,
            timestamp: request.time,
        },
        None,
    )?;

    Ok(Json(SubmitResponse {
        event: submission.event,
        notifications: submission.notifications,
    }))
}
