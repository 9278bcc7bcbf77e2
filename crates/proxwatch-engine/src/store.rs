//! Append-only store of geotagged prediction events.
//!
//! The store owns every [`PredictionEvent`] in the process. Appends assign
//! identity and timestamp; nothing is ever removed through this interface
//! (retention is an external concern). Reads return snapshots: a read
//! started after an append completes observes that event, and no read ever
//! observes a partially-constructed one.

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use proxwatch_core::{NewEvent, PredictionEvent, Result};

/// In-memory, append-only event store.
///
/// Thread-safe: share across threads via `Arc<EventStore>`. The `Result`
/// surface exists so a durable backend can report
/// [`proxwatch_core::Error::StorageUnavailable`] without changing callers;
/// the in-memory implementation is infallible.
#[derive(Debug, Default)]
pub struct EventStore {
    events: RwLock<Vec<PredictionEvent>>,
}

impl EventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new event, assigning its id and (if absent) timestamp.
    ///
    /// The returned event is visible to every read that starts after this
    /// call returns.
    pub fn append(&self, new: NewEvent) -> Result<PredictionEvent> {
        let event = PredictionEvent {
            id: Uuid::new_v4(),
            actor_id: new.actor_id,
            actor_name: new.actor_name,
            coordinate: new.coordinate,
            disease: new.disease,
            timestamp: new.timestamp.unwrap_or_else(Utc::now),
        };
        self.events.write().push(event.clone());
        Ok(event)
    }

    /// Snapshot of all events in insertion order.
    pub fn all(&self) -> Result<Vec<PredictionEvent>> {
        Ok(self.events.read().clone())
    }

    /// Snapshot of all events owned by actors other than `actor_id`,
    /// in insertion order.
    pub fn for_other_actors(&self, actor_id: &str) -> Result<Vec<PredictionEvent>> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| e.actor_id != actor_id)
            .cloned()
            .collect())
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}
