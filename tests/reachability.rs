//! Reachability checks against real local endpoints.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use netaware_client::config::{ConnectivityConfig, RetryConfig};
use netaware_client::connectivity::{
    ConnectivityOracle, FallbackProbe, HttpProbe, ProbeError, ReachabilityProbe, StaticProbe,
};
use netaware_client::{HttpTransport, ResilientPipeline, TransportRequest};
use tokio_util::sync::CancellationToken;
use url::Url;

mod common;

fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn url(addr: SocketAddr, path: &str) -> Url {
    Url::parse(&format!("http://{}{}", addr, path)).unwrap()
}

fn config_for(endpoints: &[Url], probe_timeout_ms: u64) -> ConnectivityConfig {
    ConnectivityConfig {
        probe_endpoints: endpoints.iter().map(Url::to_string).collect(),
        probe_timeout_ms,
        ..ConnectivityConfig::default()
    }
}

fn http_probe(config: &ConnectivityConfig) -> HttpProbe {
    let endpoints = config
        .probe_endpoints
        .iter()
        .map(|raw| Url::parse(raw).unwrap())
        .collect();
    HttpProbe::from_client(local_client(), endpoints)
        .unwrap()
        .with_endpoint_timeout(config.endpoint_timeout())
}

#[tokio::test]
async fn test_silent_first_endpoint_does_not_hide_second() {
    let silent = common::start_silent_backend().await;
    let (healthy, _server) = common::start_ok_backend().await;
    let config = config_for(&[url(silent, "/"), url(healthy, "/health")], 300);

    let oracle = ConnectivityOracle::new(Arc::new(http_probe(&config)), &config);
    oracle.report(false);

    let started = Instant::now();
    assert!(oracle.probe_reachability().await);
    assert!(started.elapsed() < Duration::from_millis(300));
    assert!(oracle.is_reachable_now());
}

#[tokio::test]
async fn test_retry_survives_silent_first_endpoint() {
    let silent = common::start_silent_backend().await;
    let (healthy, _health_server) = common::start_ok_backend().await;
    let config = config_for(&[url(silent, "/"), url(healthy, "/health")], 400);
    let oracle = Arc::new(ConnectivityOracle::new(Arc::new(http_probe(&config)), &config));

    let attempts = Arc::new(std::sync::atomic::AtomicU32::new(0));
    let seen = attempts.clone();
    let (backend, _backend_server) = common::start_programmable_backend(move |_| {
        let n = seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        async move {
            if n == 0 {
                (503, "busy".to_string())
            } else {
                (200, "ready".to_string())
            }
        }
    })
    .await;

    let retries = RetryConfig {
        base_delay_ms: 10,
        max_delay_ms: 50,
        ..RetryConfig::default()
    };
    let pipeline = ResilientPipeline::new(HttpTransport::from_client(local_client()), oracle, retries);
    let response = pipeline
        .execute(&TransportRequest::get(url(backend, "/courses")), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.text(), "ready");
    assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_all_endpoints_down_is_an_error() {
    let config = config_for(&[url(common::closed_addr(), "/"), url(common::closed_addr(), "/")], 1000);
    let probe = http_probe(&config);

    assert!(matches!(probe.probe().await, Err(ProbeError::Failed(_))));

    let oracle = ConnectivityOracle::new(Arc::new(probe), &config);
    assert!(!oracle.probe_reachability().await);
}

#[tokio::test]
async fn test_fallback_answers_when_every_endpoint_fails() {
    let config = config_for(&[url(common::closed_addr(), "/health")], 1000);
    let platform = Arc::new(StaticProbe::new(true));
    let probe: Arc<dyn ReachabilityProbe> = Arc::new(FallbackProbe::new(
        Arc::new(http_probe(&config)),
        platform.clone(),
    ));

    let oracle = ConnectivityOracle::new(probe, &config);
    oracle.report(false);

    assert!(oracle.probe_reachability().await);
    assert_eq!(platform.calls(), 1);
}

#[tokio::test]
async fn test_fallback_unused_while_an_endpoint_answers() {
    let (healthy, _server) = common::start_ok_backend().await;
    let config = config_for(&[url(healthy, "/health")], 1000);
    let platform = Arc::new(StaticProbe::new(false));
    let probe = FallbackProbe::new(Arc::new(http_probe(&config)), platform.clone());

    assert_eq!(probe.probe().await, Ok(true));
    assert_eq!(platform.calls(), 0);
}
