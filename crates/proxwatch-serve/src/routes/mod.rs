//! API route definitions.

mod events;
mod health;
mod live;
mod locations;
mod notifications;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
///
/// # Route Structure
///
/// - `GET /health` - Health check
/// - `GET /ws` - WebSocket upgrade for live push
///
/// ### API
/// - `POST /api/v1/locations` - Submit a geotagged prediction event
/// - `GET /api/v1/events` - All stored events (live-map bootstrap)
/// - `GET /api/v1/notifications` - All notifications, or `?since=N` for
///   those strictly after sequence position N
pub fn router(state: AppState) -> Router {
    let api_v1 = Router::new()
        .route("/locations", post(locations::submit))
        .route("/events", get(events::list))
        .route("/notifications", get(notifications::list));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ws", get(live::upgrade))
        .nest("/api/v1", api_v1)
        .with_state(state)
}
