//! Live fan-out of engine events to connected subscribers.
//!
//! Built on `tokio::sync::broadcast`: publish is non-blocking and
//! best-effort, a publish observes a consistent snapshot of current
//! receivers, and dropping a [`Subscription`] releases its membership
//! immediately. Delivery is at-most-once per connected subscriber; there
//! is no retry and no persistence - disconnected consumers catch up over
//! the pull path.
//!
//! Sender exclusion works the way socket.io's `broadcast.emit` does: each
//! published envelope carries the originating subscriber id (if any), and
//! every subscription silently skips envelopes attributed to itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use proxwatch_core::{Notification, PredictionEvent};

/// Default capacity of the broadcast channel.
///
/// A subscriber that falls more than this many messages behind loses the
/// oldest ones (lag is logged, delivery continues).
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Opaque identity of a live subscriber connection.
pub type SubscriberId = Uuid;

/// The two-message vocabulary pushed to live subscribers.
///
/// Also accepted inbound: live connections may relay `locationUpdate`
/// frames from clients, which are re-broadcast to everyone else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LiveMessage {
    /// A newly stored (or relayed) location update.
    #[serde(rename_all = "camelCase")]
    LocationUpdate {
        actor_id: String,
        name: String,
        latitude: f64,
        longitude: f64,
        disease: String,
        timestamp: DateTime<Utc>,
    },

    /// A newly created proximity notification.
    #[serde(rename_all = "camelCase")]
    Notification {
        id: Uuid,
        title: String,
        message: String,
        details: String,
        timestamp: DateTime<Utc>,
    },
}

impl From<&PredictionEvent> for LiveMessage {
    fn from(event: &PredictionEvent) -> Self {
        Self::LocationUpdate {
            actor_id: event.actor_id.clone(),
            name: event.actor_name.clone(),
            latitude: event.coordinate.latitude(),
            longitude: event.coordinate.longitude(),
            disease: event.disease.clone(),
            timestamp: event.timestamp,
        }
    }
}

impl From<&Notification> for LiveMessage {
    fn from(notification: &Notification) -> Self {
        Self::Notification {
            id: notification.id,
            title: notification.title.clone(),
            message: notification.message.clone(),
            details: notification.details.clone(),
            timestamp: notification.timestamp,
        }
    }
}

/// A published message plus its attribution, as carried on the channel.
#[derive(Debug, Clone)]
struct Envelope {
    origin: Option<SubscriberId>,
    message: LiveMessage,
}

/// Publish/subscribe fan-out of live messages.
///
/// Thread-safe and cheap to share via `Arc<Broadcaster>`. Publishing with
/// no subscribers is a no-op.
#[derive(Debug)]
pub struct Broadcaster {
    tx: broadcast::Sender<Envelope>,
}

impl Broadcaster {
    /// Create a broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a new live subscriber.
    ///
    /// The returned [`Subscription`] is a guard: dropping it disconnects
    /// the subscriber and releases its channel membership.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            rx: self.tx.subscribe(),
        }
    }

    /// Publish a message to every current subscriber except `origin`.
    ///
    /// Fire-and-forget: never blocks, never fails the caller. A send error
    /// only means no subscriber is connected.
    pub fn publish(&self, origin: Option<SubscriberId>, message: LiveMessage) {
        let _ = self.tx.send(Envelope { origin, message });
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

/// A live subscriber's receiving end.
pub struct Subscription {
    id: SubscriberId,
    rx: broadcast::Receiver<Envelope>,
}

impl Subscription {
    /// This subscriber's connection id.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Receive the next message addressed to this subscriber.
    ///
    /// Skips messages attributed to this subscription and keeps receiving
    /// after lag (dropped messages are logged and lost, per the
    /// best-effort contract). Returns `None` once the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<LiveMessage> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) if envelope.origin == Some(self.id) => continue,
                Ok(envelope) => return Some(envelope.message),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        subscriber = %self.id,
                        skipped,
                        "subscriber lagged; dropping missed messages"
                    );
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn location(actor: &str) -> LiveMessage {
        LiveMessage::LocationUpdate {
            actor_id: actor.to_string(),
            name: actor.to_uppercase(),
            latitude: 16.8280,
            longitude: 121.6550,
            disease: "mange".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn actor_of(message: &LiveMessage) -> String {
        match message {
            LiveMessage::LocationUpdate { actor_id, .. } => actor_id.clone(),
            LiveMessage::Notification { .. } => panic!("expected location update"),
        }
    }

    #[tokio::test]
    async fn test_fan_out_reaches_every_subscriber() {
        let broadcaster = Broadcaster::new(16);
        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();

        broadcaster.publish(None, location("a"));

        assert_eq!(actor_of(&first.recv().await.unwrap()), "a");
        assert_eq!(actor_of(&second.recv().await.unwrap()), "a");
    }

    #[tokio::test]
    async fn test_originating_subscriber_is_excluded() {
        let broadcaster = Broadcaster::new(16);
        let mut origin = broadcaster.subscribe();
        let mut other = broadcaster.subscribe();

        broadcaster.publish(Some(origin.id()), location("a"));
        broadcaster.publish(None, location("b"));

        // The other subscriber sees both messages.
        assert_eq!(actor_of(&other.recv().await.unwrap()), "a");
        assert_eq!(actor_of(&other.recv().await.unwrap()), "b");

        // The origin skips its own message and sees only the second.
        assert_eq!(actor_of(&origin.recv().await.unwrap()), "b");
    }

    #[tokio::test]
    async fn test_publish_order_is_preserved_per_subscriber() {
        let broadcaster = Broadcaster::new(16);
        let mut sub = broadcaster.subscribe();

        for actor in ["a", "b", "c"] {
            broadcaster.publish(None, location(actor));
        }

        assert_eq!(actor_of(&sub.recv().await.unwrap()), "a");
        assert_eq!(actor_of(&sub.recv().await.unwrap()), "b");
        assert_eq!(actor_of(&sub.recv().await.unwrap()), "c");
    }

    #[tokio::test]
    async fn test_drop_releases_membership() {
        let broadcaster = Broadcaster::new(16);
        let first = broadcaster.subscribe();
        let second = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        drop(first);
        assert_eq!(broadcaster.subscriber_count(), 1);
        drop(second);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_noop() {
        let broadcaster = Broadcaster::new(16);
        // Must not panic or block.
        broadcaster.publish(None, location("a"));
    }

    #[tokio::test]
    async fn test_dropped_subscriber_does_not_affect_others() {
        let broadcaster = Broadcaster::new(16);
        let gone = broadcaster.subscribe();
        let mut alive = broadcaster.subscribe();
        drop(gone);

        broadcaster.publish(None, location("a"));
        assert_eq!(actor_of(&alive.recv().await.unwrap()), "a");
    }

    #[tokio::test]
    async fn test_lagged_subscriber_keeps_receiving() {
        let broadcaster = Broadcaster::new(2);
        let mut slow = broadcaster.subscribe();

        for actor in ["a", "b", "c", "d"] {
            broadcaster.publish(None, location(actor));
        }

        // The two oldest messages were dropped; the rest still arrive in
        // order.
        assert_eq!(actor_of(&slow.recv().await.unwrap()), "c");
        assert_eq!(actor_of(&slow.recv().await.unwrap()), "d");
    }

    #[test]
    fn test_live_message_wire_format() {
        let message = location("a");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "locationUpdate");
        assert_eq!(json["actorId"], "a");
        assert!(json["latitude"].is_number());

        let notification = LiveMessage::Notification {
            id: Uuid::new_v4(),
            title: "Proximity Alert".to_string(),
            message: "m".to_string(),
            details: "d".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["type"], "notification");
        assert_eq!(json["title"], "Proximity Alert");
    }
}
