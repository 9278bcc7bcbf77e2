//! Core types and shared utilities for the proximity notification engine.
//!
//! This crate provides:
//! - Coordinate validation and great-circle distance (haversine)
//! - Domain types: prediction events, proximity findings, notifications
//! - Shared error types
//!
//! It is deliberately free of async, I/O, and framework dependencies; the
//! engine and HTTP boundary live in `proxwatch-engine` and
//! `proxwatch-serve`.

mod error;
mod geo;
mod types;

// ═══════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════

/// Default proximity threshold in meters.
///
/// Two events from different actors within this distance of each other are
/// considered proximate. Operators tune this via configuration; the
/// constant only supplies the default.
pub const DEFAULT_THRESHOLD_METERS: f64 = 50.0;

pub use error::{Error, Result};
pub use geo::{haversine_distance, Coordinate, EARTH_RADIUS_METERS};
pub use types::{
    NewEvent, Notification, PredictionEvent, ProximityFinding, NOTIFICATION_TITLE,
};
