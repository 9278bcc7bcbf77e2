//! Proximity matching over the stored event set.
//!
//! On each new event the matcher scans every prior event from a different
//! actor and yields a [`ProximityFinding`] for each one within the distance
//! threshold. A full scan is sufficient at the scale this engine targets;
//! a spatial index could replace it behind the same contract.

use proxwatch_core::{haversine_distance, PredictionEvent, ProximityFinding};

/// Matches new events against the existing event set.
#[derive(Debug, Clone)]
pub struct ProximityMatcher {
    threshold_meters: f64,
}

impl ProximityMatcher {
    /// Create a matcher with the given distance threshold in meters.
    pub fn new(threshold_meters: f64) -> Self {
        Self { threshold_meters }
    }

    /// The configured distance threshold in meters.
    pub fn threshold_meters(&self) -> f64 {
        self.threshold_meters
    }

    /// Compare `event` against `candidates` and return every match.
    ///
    /// A match requires a different owning actor (actor id equality, so an
    /// actor's own earlier submissions never match each other) and a
    /// great-circle distance within the threshold. The event itself is
    /// skipped if present in `candidates`, so callers may pass a snapshot
    /// taken after the append.
    ///
    /// Findings are returned in the insertion order of the matched prior
    /// event (oldest first); this defines the order notifications are
    /// appended in.
    pub fn find_matches(
        &self,
        candidates: &[PredictionEvent],
        event: &PredictionEvent,
    ) -> Vec<ProximityFinding> {
        let mut findings = Vec::new();
        for candidate in candidates {
            if candidate.id == event.id || candidate.actor_id == event.actor_id {
                continue;
            }
            let distance = haversine_distance(&candidate.coordinate, &event.coordinate);
            if distance <= self.threshold_meters {
                findings.push(ProximityFinding {
                    event: event.clone(),
                    matched: candidate.clone(),
                    distance_meters: distance,
                });
            }
        }
        findings
    }
}
