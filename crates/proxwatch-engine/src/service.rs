//! The notification service facade.
//!
//! Orchestrates the full pipeline for an incoming prediction event:
//! store it, match it against prior events, persist each finding as a
//! notification, then push the event and any new notifications to live
//! subscribers. The append+match+persist sequence runs under a single
//! mutex so two concurrent submissions of a mutually-proximate pair can
//! never both miss the match.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use proxwatch_core::{NewEvent, Notification, PredictionEvent, ProximityFinding, Result};

use crate::broadcast::{Broadcaster, LiveMessage, SubscriberId, Subscription};
use crate::matcher::ProximityMatcher;
use crate::sink::NotificationSink;
use crate::store::EventStore;

/// Policy governing repeated matches of the same actor pair.
///
/// Whether a pair still in range should re-alert on every submission or
/// only once is an operator decision, so both are supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyPolicy {
    /// One notification per match evaluation (the default).
    Always,
    /// Suppress repeat notifications for an unordered actor pair,
    /// optionally re-alerting once the window has passed since the last
    /// alert for that pair.
    OncePerPair {
        /// Re-alert after this long; `None` means never re-alert.
        realert_after: Option<Duration>,
    },
}

impl Default for NotifyPolicy {
    fn default() -> Self {
        Self::Always
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone)]
pub struct Submission {
    /// The stored event, with assigned identity and timestamp.
    pub event: PredictionEvent,
    /// Notifications created by this submission, in match order.
    pub notifications: Vec<Notification>,
}

/// Orchestrates event storage, proximity matching, notification
/// persistence, and live fan-out.
///
/// One instance owns the process-wide engine state; construct it at
/// startup and share it via `Arc`.
pub struct NotificationService {
    store: EventStore,
    sink: NotificationSink,
    matcher: ProximityMatcher,
    broadcaster: Broadcaster,
    policy: NotifyPolicy,
    /// Serializes append+match+persist across submissions.
    submit_lock: Mutex<()>,
    /// Last alert time per unordered actor pair, for `OncePerPair`.
    alerted_pairs: Mutex<HashMap<(String, String), DateTime<Utc>>>,
}

impl NotificationService {
    /// Create a service with the given threshold, notify policy, and
    /// broadcast channel capacity.
    pub fn new(threshold_meters: f64, policy: NotifyPolicy, broadcast_capacity: usize) -> Self {
        Self {
            store: EventStore::new(),
            sink: NotificationSink::new(),
            matcher: ProximityMatcher::new(threshold_meters),
            broadcaster: Broadcaster::new(broadcast_capacity),
            policy,
            submit_lock: Mutex::new(()),
            alerted_pairs: Mutex::new(HashMap::new()),
        }
    }

    /// The configured proximity threshold in meters.
    pub fn threshold_meters(&self) -> f64 {
        self.matcher.threshold_meters()
    }

    /// Submit a prediction event.
    ///
    /// Stores the event, matches it against all prior events, persists a
    /// notification per finding (subject to the notify policy), publishes
    /// the event and each new notification to live subscribers, and
    /// returns both. The raw event is published even when there are zero
    /// matches, for live-map consumers.
    ///
    /// `origin` attributes the resulting location update to a live
    /// subscriber so it is excluded from its own broadcast; pass `None`
    /// for plain API submissions.
    pub fn submit(&self, new: NewEvent, origin: Option<SubscriberId>) -> Result<Submission> {
        let (event, notifications) = {
            let _guard = self.submit_lock.lock();

            let event = self.store.append(new)?;
            let candidates = self.store.all()?;
            let findings = self.matcher.find_matches(&candidates, &event);

            let mut notifications = Vec::with_capacity(findings.len());
            for finding in &findings {
                if !self.policy_allows(finding) {
                    tracing::debug!(
                        actor = %finding.event.actor_id,
                        other = %finding.matched.actor_id,
                        "repeat match suppressed by notify policy"
                    );
                    continue;
                }
                notifications.push(
                    self.sink
                        .append(finding, self.matcher.threshold_meters())?,
                );
            }
            (event, notifications)
        };

        tracing::info!(
            event = %event.id,
            actor = %event.actor_id,
            matches = notifications.len(),
            "event processed"
        );

        // Publishing happens outside the critical section; it is
        // fire-and-forget and must never block a submitter.
        self.broadcaster.publish(origin, LiveMessage::from(&event));
        for notification in &notifications {
            self.broadcaster
                .publish(None, LiveMessage::from(notification));
        }

        Ok(Submission {
            event,
            notifications,
        })
    }

    /// Whether the notify policy permits alerting for this finding.
    ///
    /// Called under the submit lock, so the pair bookkeeping cannot race
    /// between two submissions.
    fn policy_allows(&self, finding: &ProximityFinding) -> bool {
        let realert_after = match &self.policy {
            NotifyPolicy::Always => return true,
            NotifyPolicy::OncePerPair { realert_after } => *realert_after,
        };

        let key = pair_key(&finding.event.actor_id, &finding.matched.actor_id);
        let now = Utc::now();
        let mut alerted = self.alerted_pairs.lock();
        match alerted.get(&key) {
            None => {
                alerted.insert(key, now);
                true
            }
            Some(last) => match realert_after {
                Some(window) if (now - *last).to_std().unwrap_or(Duration::ZERO) >= window => {
                    alerted.insert(key, now);
                    true
                }
                _ => false,
            },
        }
    }

    /// All notifications, in sequence order (pull path).
    pub fn notifications(&self) -> Result<Vec<Notification>> {
        self.sink.all()
    }

    /// Notifications strictly after the given sequence position.
    pub fn notifications_since(&self, seq: u64) -> Result<Vec<Notification>> {
        self.sink.since(seq)
    }

    /// All stored events, in insertion order (live-map bootstrap).
    pub fn events(&self) -> Result<Vec<PredictionEvent>> {
        self.store.all()
    }

    /// Register a live subscriber.
    pub fn subscribe(&self) -> Subscription {
        self.broadcaster.subscribe()
    }

    /// Re-broadcast a subscriber-originated message to everyone else.
    ///
    /// Used by the live connection handler for client-relayed location
    /// updates that are not stored (they carry no prediction record).
    pub fn publish_from(&self, origin: SubscriberId, message: LiveMessage) {
        self.broadcaster.publish(Some(origin), message);
    }

    /// Number of currently connected live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }
}

/// Unordered pair key: the same two actors always map to the same key.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxwatch_core::Coordinate;

    fn service() -> NotificationService {
        NotificationService::new(50.0, NotifyPolicy::Always, 64)
    }

    fn new_event(actor: &str, name: &str, lat: f64, lon: f64, disease: &str) -> NewEvent {
        NewEvent {
            actor_id: actor.to_string(),
            actor_name: name.to_string(),
            coordinate: Coordinate::new(lat, lon).unwrap(),
            disease: disease.to_string(),
            timestamp: None,
        }
    }

    // =========================================================================
    // End-to-end pipeline
    // =========================================================================

    #[tokio::test]
    async fn test_proximate_pair_produces_one_notification() {
        let svc = service();
        let mut sub = svc.subscribe();

        let first = svc
            .submit(new_event("a", "A", 16.8280, 121.6550, "mange"), None)
            .unwrap();
        assert!(first.notifications.is_empty());

        let second = svc
            .submit(new_event("b", "B", 16.8281, 121.6551, "scabies"), None)
            .unwrap();
        assert_eq!(second.notifications.len(), 1);

        let n = &second.notifications[0];
        assert_eq!(n.title, "Proximity Alert");
        assert!(n.message.contains('A') && n.message.contains('B'));
        assert!(n.details.contains("mange") && n.details.contains("scabies"));

        // A subscriber connected before both submissions sees two location
        // updates then the notification, in that relative order.
        assert!(matches!(
            sub.recv().await.unwrap(),
            LiveMessage::LocationUpdate { .. }
        ));
        assert!(matches!(
            sub.recv().await.unwrap(),
            LiveMessage::LocationUpdate { .. }
        ));
        assert!(matches!(
            sub.recv().await.unwrap(),
            LiveMessage::Notification { .. }
        ));
    }

    #[tokio::test]
    async fn test_isolated_event_still_broadcasts_location() {
        let svc = service();
        let mut sub = svc.subscribe();

        let outcome = svc
            .submit(new_event("c", "C", 0.0, 0.0, "mange"), None)
            .unwrap();
        assert!(outcome.notifications.is_empty());
        assert!(svc.notifications().unwrap().is_empty());

        assert!(matches!(
            sub.recv().await.unwrap(),
            LiveMessage::LocationUpdate { .. }
        ));
    }

    #[test]
    fn test_same_actor_never_matches_itself() {
        let svc = service();
        svc.submit(new_event("a", "A", 16.8280, 121.6550, "mange"), None)
            .unwrap();
        let second = svc
            .submit(new_event("a", "A", 16.8280, 121.6550, "mange"), None)
            .unwrap();
        assert!(second.notifications.is_empty());
        assert!(svc.notifications().unwrap().is_empty());
    }

    #[test]
    fn test_pull_path_is_ordered_and_idempotent() {
        let svc = service();
        svc.submit(new_event("a", "A", 0.0, 0.0, "mange"), None)
            .unwrap();
        svc.submit(new_event("b", "B", 0.0, 0.0001, "scabies"), None)
            .unwrap();
        svc.submit(new_event("c", "C", 0.00005, 0.0, "rabies"), None)
            .unwrap();

        let all = svc.notifications().unwrap();
        assert!(!all.is_empty());
        let seqs: Vec<u64> = all.iter().map(|n| n.seq).collect();
        let mut sorted = seqs.clone();
        sorted.sort_unstable();
        assert_eq!(seqs, sorted);

        assert_eq!(svc.notifications().unwrap(), all);
        let last = seqs.last().copied().unwrap();
        assert!(svc.notifications_since(last).unwrap().is_empty());
    }

    #[test]
    fn test_multiple_prior_matches_notify_in_insertion_order() {
        let svc = service();
        svc.submit(new_event("a", "A", 0.0, 0.0, "mange"), None)
            .unwrap();
        svc.submit(new_event("b", "B", 0.0, 0.0001, "scabies"), None)
            .unwrap();
        let third = svc
            .submit(new_event("c", "C", 0.0, 0.00005, "rabies"), None)
            .unwrap();

        // C matches A (oldest) then B, in store insertion order.
        assert_eq!(third.notifications.len(), 2);
        assert_eq!(third.notifications[0].other_actor_id, "a");
        assert_eq!(third.notifications[1].other_actor_id, "b");
        assert!(third.notifications[0].seq < third.notifications[1].seq);
    }

    #[test]
    fn test_concurrent_proximate_submissions_never_drop_the_match() {
        use std::sync::Arc;

        // Repeat the race a few times; at least one direction of the match
        // must be detected on every run.
        for _ in 0..20 {
            let svc = Arc::new(service());
            let a = {
                let svc = Arc::clone(&svc);
                std::thread::spawn(move || {
                    svc.submit(new_event("a", "A", 16.8280, 121.6550, "mange"), None)
                        .unwrap()
                })
            };
            let b = {
                let svc = Arc::clone(&svc);
                std::thread::spawn(move || {
                    svc.submit(new_event("b", "B", 16.8281, 121.6551, "scabies"), None)
                        .unwrap()
                })
            };
            a.join().unwrap();
            b.join().unwrap();

            let total = svc.notifications().unwrap().len();
            assert!(total >= 1, "race dropped the proximity match");
        }
    }

    // =========================================================================
    // Notify policy
    // =========================================================================

    #[test]
    fn test_always_policy_realerts_on_every_submission() {
        let svc = service();
        svc.submit(new_event("a", "A", 0.0, 0.0, "mange"), None)
            .unwrap();
        svc.submit(new_event("b", "B", 0.0, 0.0, "scabies"), None)
            .unwrap();
        svc.submit(new_event("b", "B", 0.0, 0.0, "scabies"), None)
            .unwrap();
        assert_eq!(svc.notifications().unwrap().len(), 2);
    }

    #[test]
    fn test_once_per_pair_suppresses_repeats() {
        let svc = NotificationService::new(
            50.0,
            NotifyPolicy::OncePerPair {
                realert_after: None,
            },
            64,
        );
        svc.submit(new_event("a", "A", 0.0, 0.0, "mange"), None)
            .unwrap();
        svc.submit(new_event("b", "B", 0.0, 0.0, "scabies"), None)
            .unwrap();
        // Either direction of the pair stays suppressed.
        svc.submit(new_event("b", "B", 0.0, 0.0, "scabies"), None)
            .unwrap();
        svc.submit(new_event("a", "A", 0.0, 0.0, "mange"), None)
            .unwrap();
        assert_eq!(svc.notifications().unwrap().len(), 1);
    }

    #[test]
    fn test_once_per_pair_realerts_after_window() {
        let svc = NotificationService::new(
            50.0,
            NotifyPolicy::OncePerPair {
                realert_after: Some(Duration::from_millis(10)),
            },
            64,
        );
        svc.submit(new_event("a", "A", 0.0, 0.0, "mange"), None)
            .unwrap();
        svc.submit(new_event("b", "B", 0.0, 0.0, "scabies"), None)
            .unwrap();
        assert_eq!(svc.notifications().unwrap().len(), 1);

        std::thread::sleep(Duration::from_millis(20));
        svc.submit(new_event("b", "B", 0.0, 0.0, "scabies"), None)
            .unwrap();
        assert_eq!(svc.notifications().unwrap().len(), 2);
    }

    #[test]
    fn test_once_per_pair_does_not_suppress_other_pairs() {
        let svc = NotificationService::new(
            50.0,
            NotifyPolicy::OncePerPair {
                realert_after: None,
            },
            64,
        );
        svc.submit(new_event("a", "A", 0.0, 0.0, "mange"), None)
            .unwrap();
        svc.submit(new_event("b", "B", 0.0, 0.0, "scabies"), None)
            .unwrap();
        svc.submit(new_event("c", "C", 0.0, 0.0, "rabies"), None)
            .unwrap();
        // a-b alerted once, then c alerts against both a and b.
        assert_eq!(svc.notifications().unwrap().len(), 3);
    }
}
