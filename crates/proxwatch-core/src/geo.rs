//! Geographic coordinates and great-circle distance.
//!
//! This module provides:
//! - [`Coordinate`], a validated (latitude, longitude) pair in degrees
//! - [`haversine_distance`], the great-circle surface distance in meters
//!
//! Validation happens once, at construction (including deserialization);
//! the distance function trusts its inputs and never re-validates.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in meters, as used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A validated geographic coordinate in decimal degrees.
///
/// Latitude is constrained to `[-90, 90]` and longitude to `[-180, 180]`.
/// NaN and out-of-range values are rejected at construction with
/// [`Error::InvalidLocation`], never silently coerced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

/// Unvalidated mirror of [`Coordinate`] used as the deserialization source.
#[derive(Debug, Clone, Copy, Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = Error;

    fn try_from(raw: RawCoordinate) -> Result<Self> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Create a coordinate, validating both components.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLocation`] if either component is NaN or
    /// outside its valid range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() {
            return Err(Error::InvalidLocation {
                field: "latitude",
                reason: format!("{} is not a finite number", latitude),
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidLocation {
                field: "latitude",
                reason: format!("{} is out of range [-90, 90]", latitude),
            });
        }
        if !longitude.is_finite() {
            return Err(Error::InvalidLocation {
                field: "longitude",
                reason: format!("{} is not a finite number", longitude),
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidLocation {
                field: "longitude",
                reason: format!("{} is out of range [-180, 180]", longitude),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Great-circle surface distance between two coordinates, in meters.
///
/// Uses the haversine formula with the mean Earth radius
/// ([`EARTH_RADIUS_METERS`]). Returns exactly `0.0` when both coordinates
/// are equal and stays numerically stable for antipodal points.
pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi_a = a.latitude.to_radians();
    let phi_b = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (delta_lambda / 2.0).sin().powi(2);

    // Rounding can push h a hair above 1.0 for antipodal points, which
    // would make sqrt(1 - h) NaN.
    let h = h.min(1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}
