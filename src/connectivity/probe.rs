//! Active reachability probes.
//!
//! # Responsibilities
//! - Answer "can we reach the network right now" with one round-trip
//! - Try several endpoints before declaring the network down
//! - Fall back to a secondary signal when the primary probe errors
//!
//! # Design Decisions
//! - Any HTTP response counts as reachable, whatever its status
//! - Probes may error; the oracle turns errors into "unreachable"
//! - Each endpoint gets an equal share of the probe budget so a hanging
//!   first endpoint cannot starve the rest

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::config::ConnectivityConfig;

/// Errors a probe can report instead of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("no probe endpoints configured")]
    NoEndpoints,

    #[error("invalid probe endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("probe client error: {0}")]
    Client(String),

    #[error("probe failed: {0}")]
    Failed(String),
}

/// On-demand reachability check.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    async fn probe(&self) -> Result<bool, ProbeError>;
}

/// Sends `HEAD` to each endpoint in turn until one answers.
///
/// Fails with [`ProbeError::Failed`] when no endpoint answers, so a
/// [`FallbackProbe`] can take over.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    endpoints: Vec<Url>,
    endpoint_timeout: Option<Duration>,
}

impl HttpProbe {
    pub fn new(endpoints: Vec<Url>, endpoint_timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self::from_client(client, endpoints)?.with_endpoint_timeout(endpoint_timeout))
    }

    /// Probe with an existing client and no per-endpoint limit of its own.
    pub fn from_client(client: reqwest::Client, endpoints: Vec<Url>) -> Result<Self, ProbeError> {
        if endpoints.is_empty() {
            return Err(ProbeError::NoEndpoints);
        }
        Ok(Self {
            client,
            endpoints,
            endpoint_timeout: None,
        })
    }

    /// Give up on a single endpoint after `limit`.
    pub fn with_endpoint_timeout(mut self, limit: Duration) -> Self {
        self.endpoint_timeout = Some(limit);
        self
    }

    pub fn from_config(config: &ConnectivityConfig) -> Result<Self, ProbeError> {
        let endpoints = config
            .probe_endpoints
            .iter()
            .map(|raw| Url::parse(raw).map_err(|_| ProbeError::InvalidEndpoint(raw.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(endpoints, config.endpoint_timeout())
    }

    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }
}

#[async_trait]
impl ReachabilityProbe for HttpProbe {
    async fn probe(&self) -> Result<bool, ProbeError> {
        let mut last_error = None;
        for endpoint in &self.endpoints {
            let mut request = self.client.head(endpoint.clone());
            if let Some(limit) = self.endpoint_timeout {
                request = request.timeout(limit);
            }

            match request.send().await {
                Ok(response) => {
                    tracing::trace!(endpoint = %endpoint, status = %response.status(), "Probe endpoint answered");
                    return Ok(true);
                }
                Err(e) => {
                    tracing::debug!(endpoint = %endpoint, error = %e, "Probe endpoint unreachable");
                    last_error = Some(e.to_string());
                }
            }
        }

        Err(ProbeError::Failed(format!(
            "all {} endpoints failed, last error: {}",
            self.endpoints.len(),
            last_error.unwrap_or_default()
        )))
    }
}

/// Answers from a shared flag. Useful where only the platform push
/// signal exists, and in tests.
#[derive(Debug, Default)]
pub struct StaticProbe {
    reachable: AtomicBool,
    calls: AtomicUsize,
}

impl StaticProbe {
    pub fn new(reachable: bool) -> Self {
        Self {
            reachable: AtomicBool::new(reachable),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Number of probes answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReachabilityProbe for StaticProbe {
    async fn probe(&self) -> Result<bool, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reachable.load(Ordering::SeqCst))
    }
}

/// Uses `fallback` whenever `primary` errors.
///
/// Pairs an active probe with a passive signal, the way a browser's
/// online flag backs up a failed ping.
pub struct FallbackProbe {
    primary: Arc<dyn ReachabilityProbe>,
    fallback: Arc<dyn ReachabilityProbe>,
}

impl FallbackProbe {
    pub fn new(primary: Arc<dyn ReachabilityProbe>, fallback: Arc<dyn ReachabilityProbe>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl ReachabilityProbe for FallbackProbe {
    async fn probe(&self) -> Result<bool, ProbeError> {
        match self.primary.probe().await {
            Ok(reachable) => Ok(reachable),
            Err(e) => {
                tracing::debug!(error = %e, "Primary probe failed, using fallback");
                self.fallback.probe().await
            }
        }
    }
}

/// Build the probe described by `config`.
///
/// Unusable endpoints degrade to a fixed answer of `assume_reachable`.
/// With `fallback_reachable` set, that value answers whenever every
/// endpoint fails.
pub fn build_probe(config: &ConnectivityConfig) -> Arc<dyn ReachabilityProbe> {
    let http = match HttpProbe::from_config(config) {
        Ok(probe) => probe,
        Err(e) => {
            tracing::warn!(
                error = %e,
                assume_reachable = config.assume_reachable,
                "No usable probe endpoints, reachability will stay at its configured value"
            );
            return Arc::new(StaticProbe::new(config.assume_reachable));
        }
    };

    tracing::info!(
        endpoints = ?http.endpoints().iter().map(Url::as_str).collect::<Vec<_>>(),
        endpoint_timeout = ?config.endpoint_timeout(),
        fallback = ?config.fallback_reachable,
        "Active connectivity probe configured"
    );

    match config.fallback_reachable {
        Some(reachable) => Arc::new(FallbackProbe::new(
            Arc::new(http),
            Arc::new(StaticProbe::new(reachable)),
        )),
        None => Arc::new(http),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    #[async_trait]
    impl ReachabilityProbe for Broken {
        async fn probe(&self) -> Result<bool, ProbeError> {
            Err(ProbeError::Failed("boom".into()))
        }
    }

    #[tokio::test]
    async fn test_static_probe_counts_calls() {
        let probe = StaticProbe::new(true);
        assert_eq!(probe.probe().await, Ok(true));
        probe.set(false);
        assert_eq!(probe.probe().await, Ok(false));
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test]
    async fn test_fallback_used_only_on_error() {
        let fallback = Arc::new(StaticProbe::new(false));
        let probe = FallbackProbe::new(Arc::new(Broken), fallback.clone());
        assert_eq!(probe.probe().await, Ok(false));
        assert_eq!(fallback.calls(), 1);

        let probe = FallbackProbe::new(Arc::new(StaticProbe::new(true)), fallback.clone());
        assert_eq!(probe.probe().await, Ok(true));
        assert_eq!(fallback.calls(), 1);
    }

    #[test]
    fn test_http_probe_requires_endpoints() {
        let config = ConnectivityConfig {
            probe_endpoints: Vec::new(),
            ..ConnectivityConfig::default()
        };
        assert_eq!(HttpProbe::from_config(&config).unwrap_err(), ProbeError::NoEndpoints);

        let config = ConnectivityConfig {
            probe_endpoints: vec!["::not-a-url".into()],
            ..ConnectivityConfig::default()
        };
        assert!(matches!(
            HttpProbe::from_config(&config),
            Err(ProbeError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_http_probe_unreachable_endpoints() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/health", addr)).unwrap();
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let probe = HttpProbe::from_client(client, vec![url]).unwrap();
        assert!(matches!(probe.probe().await, Err(ProbeError::Failed(_))));
    }

    #[tokio::test]
    async fn test_build_probe_without_endpoints_is_static() {
        let config = ConnectivityConfig {
            probe_endpoints: Vec::new(),
            assume_reachable: false,
            fallback_reachable: Some(true),
            ..ConnectivityConfig::default()
        };
        assert_eq!(build_probe(&config).probe().await, Ok(false));
    }

    #[test]
    fn test_from_config_splits_budget_across_endpoints() {
        let config = ConnectivityConfig {
            probe_endpoints: vec!["http://a.test/".into(), "http://b.test/".into()],
            probe_timeout_ms: 3000,
            ..ConnectivityConfig::default()
        };
        let probe = HttpProbe::from_config(&config).unwrap();
        assert_eq!(probe.endpoints().len(), 2);
        assert_eq!(probe.endpoint_timeout, Some(Duration::from_millis(1500)));
    }
}
