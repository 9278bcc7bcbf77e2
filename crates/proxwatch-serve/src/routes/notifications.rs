//! Notification pull endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use proxwatch_core::Notification;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the notification list.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    /// Return only notifications strictly after this sequence position.
    pub since: Option<u64>,
}

/// `GET /api/v1/notifications`
///
/// The pull path for consumers that are not live-subscribed. Returns
/// notifications in sequence order; `?since=N` returns the tail strictly
/// after position N.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let notifications = match query.since {
        Some(seq) => state.service.notifications_since(seq)?,
        None => state.service.notifications()?,
    };
    Ok(Json(notifications))
}
