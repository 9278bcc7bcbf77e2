//! Proxwatch Serve - HTTP and WebSocket boundary for the proximity engine.
//!
//! This crate maps the notification engine onto a small HTTP API plus a
//! WebSocket push channel. The surrounding record-keeping application
//! (auth, profiles, uploads) lives elsewhere and calls these endpoints
//! after persisting its own domain records.
//!
//! # Architecture
//!
//! - **AppState**: Shared application state (the notification service,
//!   configuration)
//! - **Routes**: Endpoint handlers - event submission, pull reads, live
//!   WebSocket push

mod error;
mod routes;
mod state;

pub use self::error::ApiError;
pub use self::routes::router;
pub use self::state::{AppState, Config};
