//! Proximity detection and notification engine.
//!
//! This crate provides the in-process pipeline for geotagged
//! disease-prediction events:
//!
//! - [`store`] - append-only event store (candidate set for matching)
//! - [`matcher`] - proximity matching against the stored event set
//! - [`sink`] - durable, ordered notification records
//! - [`broadcast`] - live publish/subscribe fan-out with sender exclusion
//! - [`service`] - the facade orchestrating the whole pipeline
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐
//! │  submit(event) │
//! └───────┬────────┘
//!         ▼
//! ┌────────────────┐
//! │   EventStore   │  append-only, snapshot reads
//! └───────┬────────┘
//!         ▼
//! ┌────────────────┐
//! │ProximityMatcher│  full scan, distance <= threshold, cross-actor only
//! └───────┬────────┘
//!         ▼
//! ┌────────────────┐
//! │NotificationSink│  ordered, append-only notification records
//! └───────┬────────┘
//!         ▼
//! ┌────────────────┐
//! │  Broadcaster   │  best-effort push to live subscribers
//! └────────────────┘
//! ```
//!
//! Store, match, and persist run under one lock per submission; broadcast
//! is fire-and-forget. Consumers that are offline at publish time catch up
//! over the pull path ([`service::NotificationService::notifications`]).

pub mod broadcast;
pub mod matcher;
pub mod service;
pub mod sink;
pub mod store;

// Re-export commonly used types at crate root
pub use broadcast::{
    Broadcaster, LiveMessage, SubscriberId, Subscription, DEFAULT_BROADCAST_CAPACITY,
};
pub use matcher::ProximityMatcher;
pub use service::{NotificationService, NotifyPolicy, Submission};
pub use sink::NotificationSink;
pub use store::EventStore;

// Re-export the shared error surface
pub use proxwatch_core::{Error, Result};
