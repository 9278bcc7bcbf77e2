//! Application state and configuration.

use std::sync::Arc;
use std::time::Duration;

use proxwatch_engine::{NotificationService, NotifyPolicy};

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Proximity threshold in meters.
    pub threshold_meters: f64,

    /// Policy for repeated matches of the same actor pair.
    pub notify_policy: NotifyPolicy,

    /// Capacity of the live broadcast channel.
    pub broadcast_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `PROXWATCH_BIND_ADDR`: bind address (default: "0.0.0.0:8080")
    /// - `PROXWATCH_THRESHOLD_METERS`: proximity threshold (default: 50)
    /// - `PROXWATCH_NOTIFY_POLICY`: "always" or "once-per-pair"
    ///   (default: "always")
    /// - `PROXWATCH_REALERT_AFTER_SECS`: with "once-per-pair", re-alert a
    ///   pair after this many seconds (default: never)
    /// - `PROXWATCH_BROADCAST_CAPACITY`: live channel capacity (default: 256)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("PROXWATCH_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let threshold_meters = match std::env::var("PROXWATCH_THRESHOLD_METERS") {
            Ok(raw) => {
                let value: f64 = raw
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PROXWATCH_THRESHOLD_METERS is not a number: {raw}"))?;
                if !value.is_finite() || value <= 0.0 {
                    anyhow::bail!("PROXWATCH_THRESHOLD_METERS must be positive, got {raw}");
                }
                value
            }
            Err(_) => proxwatch_core::DEFAULT_THRESHOLD_METERS,
        };

        let realert_after = std::env::var("PROXWATCH_REALERT_AFTER_SECS")
            .ok()
            .map(|raw| {
                raw.parse::<u64>().map_err(|_| {
                    anyhow::anyhow!("PROXWATCH_REALERT_AFTER_SECS is not a number: {raw}")
                })
            })
            .transpose()?
            .map(Duration::from_secs);

        let notify_policy = match std::env::var("PROXWATCH_NOTIFY_POLICY").as_deref() {
            Ok("once-per-pair") => NotifyPolicy::OncePerPair { realert_after },
            Ok("always") | Err(_) => NotifyPolicy::Always,
            Ok(other) => anyhow::bail!(
                "PROXWATCH_NOTIFY_POLICY must be 'always' or 'once-per-pair', got '{other}'"
            ),
        };

        let broadcast_capacity = match std::env::var("PROXWATCH_BROADCAST_CAPACITY") {
            Ok(raw) => raw.parse().map_err(|_| {
                anyhow::anyhow!("PROXWATCH_BROADCAST_CAPACITY is not a number: {raw}")
            })?,
            Err(_) => proxwatch_engine::DEFAULT_BROADCAST_CAPACITY,
        };

        tracing::info!(
            bind_addr = %bind_addr,
            threshold_meters,
            notify_policy = ?notify_policy,
            broadcast_capacity,
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            threshold_meters,
            notify_policy,
            broadcast_capacity,
        })
    }
}

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide notification service.
    pub service: Arc<NotificationService>,

    /// Application configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new application state from configuration.
    pub fn new(config: Config) -> Self {
        let service = NotificationService::new(
            config.threshold_meters,
            config.notify_policy.clone(),
            config.broadcast_capacity,
        );
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}
