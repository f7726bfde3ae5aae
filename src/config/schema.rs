//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the network-aware client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Retry policy for the request pipeline.
    pub retries: RetryConfig,

    /// Reachability tracking and probing.
    pub connectivity: ConnectivityConfig,

    /// Underlying HTTP transport settings.
    pub transport: TransportConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// How the backoff delay grows with the attempt number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// `base * attempt`.
    #[default]
    Linear,
    /// `base * 2^(attempt - 1)`.
    Exponential,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of transport sends for one logical request.
    pub max_attempts: u32,

    /// Base delay for backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound for a single backoff delay in milliseconds.
    pub max_delay_ms: u64,

    /// Growth function for the backoff delay.
    pub strategy: BackoffStrategy,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,

    /// Allow retries for non-idempotent methods (POST, PATCH).
    /// The caller is then responsible for making re-sends safe.
    pub retry_non_idempotent: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            strategy: BackoffStrategy::Linear,
            jitter: false,
            retry_non_idempotent: true,
        }
    }
}

/// Connectivity tracking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Cached state before the first observation arrives.
    pub assume_reachable: bool,

    /// Endpoints probed in order; any HTTP response means reachable.
    pub probe_endpoints: Vec<String>,

    /// Timeout for a whole active probe in milliseconds, split evenly
    /// across the endpoints.
    pub probe_timeout_ms: u64,

    /// Interval between background probes in seconds (0 disables them).
    pub probe_interval_secs: u64,

    /// Probe once when the monitor starts.
    pub probe_on_start: bool,

    /// Per-observer notification queue depth.
    pub notify_capacity: usize,

    /// Answer used when every probe endpoint fails. Unset means such a
    /// probe reports the network as unreachable.
    pub fallback_reachable: Option<bool>,
}

impl ConnectivityConfig {
    /// Share of `probe_timeout_ms` each endpoint gets.
    pub fn endpoint_timeout(&self) -> Duration {
        let endpoints = u32::try_from(self.probe_endpoints.len().max(1)).unwrap_or(u32::MAX);
        Duration::from_millis(self.probe_timeout_ms) / endpoints
    }
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            assume_reachable: true,
            probe_endpoints: vec![
                "https://www.google.com/favicon.ico".to_string(),
                "https://cdnjs.cloudflare.com/".to_string(),
            ],
            probe_timeout_ms: 3000,
            probe_interval_secs: 15,
            probe_on_start: true,
            notify_capacity: 16,
            fallback_reachable: None,
        }
    }
}

/// HTTP transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Timeout for a single attempt (send + body read) in seconds.
    pub attempt_secs: u64,

    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            attempt_secs: 30,
            user_agent: concat!("netaware-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
