//! Durable, ordered collection of notification records.
//!
//! Append is the only mutator. Sequence positions are assigned under the
//! same lock as the append itself, so they are strictly increasing, never
//! reused, and agree with insertion order.

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use proxwatch_core::{Notification, ProximityFinding, Result, NOTIFICATION_TITLE};

#[derive(Debug, Default)]
struct SinkInner {
    notifications: Vec<Notification>,
    next_seq: u64,
}

/// In-memory, append-only notification sink.
///
/// Thread-safe: share across threads via `Arc<NotificationSink>`. As with
/// the event store, the fallible surface leaves room for a durable backend
/// to report `StorageUnavailable`.
#[derive(Debug, Default)]
pub struct NotificationSink {
    inner: RwLock<SinkInner>,
}

impl NotificationSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a notification from a finding and append it.
    ///
    /// The message names both actors and the threshold; the details name
    /// both disease labels. `threshold_meters` is only used for the
    /// message text.
    pub fn append(&self, finding: &ProximityFinding, threshold_meters: f64) -> Result<Notification> {
        let a = &finding.event;
        let b = &finding.matched;
        let message = format!(
            "{} and {} are within {} meters of each other!",
            a.actor_name, b.actor_name, threshold_meters
        );
        let details = format!(
            "{} was diagnosed with {}. {} was diagnosed with {}.",
            a.actor_name, a.disease, b.actor_name, b.disease
        );

        let mut inner = self.inner.write();
        inner.next_seq += 1;
        let notification = Notification {
            id: Uuid::new_v4(),
            seq: inner.next_seq,
            title: NOTIFICATION_TITLE.to_string(),
            message,
            details,
            timestamp: Utc::now(),
            actor_id: a.actor_id.clone(),
            actor_name: a.actor_name.clone(),
            other_actor_id: b.actor_id.clone(),
            other_actor_name: b.actor_name.clone(),
        };
        inner.notifications.push(notification.clone());
        Ok(notification)
    }

    /// Snapshot of all notifications in sequence order.
    pub fn all(&self) -> Result<Vec<Notification>> {
        Ok(self.inner.read().notifications.clone())
    }

    /// Snapshot of notifications with a sequence position strictly after
    /// `seq`.
    pub fn since(&self, seq: u64) -> Result<Vec<Notification>> {
        Ok(self
            .inner
            .read()
            .notifications
            .iter()
            .filter(|n| n.seq > seq)
            .cloned()
            .collect())
    }

    /// Number of stored notifications.
    pub fn len(&self) -> usize {
        self.inner.read().notifications.len()
    }

    /// Whether the sink is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().notifications.is_empty()
    }
}
