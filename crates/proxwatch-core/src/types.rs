//! Domain types for the proximity engine.
//!
//! - [`NewEvent`] - an incoming submission before the store assigns identity
//! - [`PredictionEvent`] - a stored, immutable geotagged prediction
//! - [`ProximityFinding`] - a derived pair of mutually-proximate events
//! - [`Notification`] - a persisted, orderable proximity alert record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

/// Fixed title of proximity alert notifications.
pub const NOTIFICATION_TITLE: &str = "Proximity Alert";

/// An incoming prediction submission, before identity assignment.
///
/// The timestamp is optional; the event store assigns the current UTC time
/// when it is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    /// Identifier of the submitting actor.
    pub actor_id: String,
    /// Display name of the submitting actor.
    pub actor_name: String,
    /// Validated submission location.
    pub coordinate: Coordinate,
    /// Opaque disease label; the engine does not interpret it.
    pub disease: String,
    /// Submission time, if supplied by the caller.
    pub timestamp: Option<DateTime<Utc>>,
}

/// A stored geotagged disease-prediction event.
///
/// Immutable once created; identity is assigned by the event store and
/// never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEvent {
    /// Unique, store-assigned event id.
    pub id: Uuid,
    /// Identifier of the owning actor.
    pub actor_id: String,
    /// Display name of the owning actor.
    pub actor_name: String,
    /// Submission location.
    pub coordinate: Coordinate,
    /// Opaque disease label.
    pub disease: String,
    /// UTC submission time.
    pub timestamp: DateTime<Utc>,
}

/// A detected proximity relationship between two events.
///
/// Derived and transient: findings exist only as input to notification
/// construction and are never persisted. `event` is the newly submitted
/// event, `matched` a prior event from a different actor within the
/// distance threshold.
#[derive(Debug, Clone)]
pub struct ProximityFinding {
    /// The newly submitted event.
    pub event: PredictionEvent,
    /// The prior event it matched against.
    pub matched: PredictionEvent,
    /// Great-circle distance between the two, in meters.
    pub distance_meters: f64,
}

/// A persisted proximity alert.
///
/// Sequence positions are strictly increasing and define read/delivery
/// order; they are never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification id.
    pub id: Uuid,
    /// Strictly-increasing sequence position.
    pub seq: u64,
    /// Fixed title, [`NOTIFICATION_TITLE`] for this kind.
    pub title: String,
    /// Human-readable message naming both actors.
    pub message: String,
    /// Human-readable details naming both disease labels.
    pub details: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Id of the actor whose submission triggered the alert.
    pub actor_id: String,
    /// Name of the actor whose submission triggered the alert.
    pub actor_name: String,
    /// Id of the matched actor.
    pub other_actor_id: String,
    /// Name of the matched actor.
    pub other_actor_name: String,
}
