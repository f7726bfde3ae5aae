//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, delays ordered, timeouts > 0)
//! - Check that probe endpoints and the metrics address parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("retries.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("retries.max_delay_ms ({max}) is smaller than retries.base_delay_ms ({base})")]
    DelayBounds { base: u64, max: u64 },

    #[error("connectivity.probe_endpoints[{index}] is not a valid http(s) URL: {value}")]
    InvalidEndpoint { index: usize, value: String },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("connectivity.probe_timeout_ms ({timeout_ms}) leaves under 1ms for each of {endpoints} endpoints")]
    ProbeBudgetTooSmall { timeout_ms: u64, endpoints: usize },

    #[error("observability.metrics_address is not a socket address: {0}")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if config.retries.max_delay_ms < config.retries.base_delay_ms {
        errors.push(ValidationError::DelayBounds {
            base: config.retries.base_delay_ms,
            max: config.retries.max_delay_ms,
        });
    }

    for (index, endpoint) in config.connectivity.probe_endpoints.iter().enumerate() {
        let valid = Url::parse(endpoint)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidEndpoint {
                index,
                value: endpoint.clone(),
            });
        }
    }

    if config.connectivity.probe_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue { field: "connectivity.probe_timeout_ms" });
    } else if config.connectivity.endpoint_timeout().is_zero() {
        errors.push(ValidationError::ProbeBudgetTooSmall {
            timeout_ms: config.connectivity.probe_timeout_ms,
            endpoints: config.connectivity.probe_endpoints.len(),
        });
    }
    if config.connectivity.notify_capacity == 0 {
        errors.push(ValidationError::ZeroValue { field: "connectivity.notify_capacity" });
    }
    if config.transport.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "transport.connect_secs" });
    }
    if config.transport.attempt_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "transport.attempt_secs" });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ClientConfig::default();
        config.retries.max_attempts = 0;
        config.retries.base_delay_ms = 500;
        config.retries.max_delay_ms = 100;
        config.connectivity.probe_endpoints = vec!["ftp://example.com".into(), "not a url".into()];
        config.transport.attempt_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroAttempts));
        assert!(errors.contains(&ValidationError::DelayBounds { base: 500, max: 100 }));
        assert!(errors.contains(&ValidationError::ZeroValue { field: "transport.attempt_secs" }));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ClientConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::InvalidMetricsAddress("nowhere".into())]);
    }

    #[test]
    fn test_probe_budget_must_cover_every_endpoint() {
        let mut config = ClientConfig::default();
        config.connectivity.probe_timeout_ms = 1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ProbeBudgetTooSmall { timeout_ms: 1, endpoints: 2 }]
        );
    }
}
