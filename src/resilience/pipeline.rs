//! Connectivity-aware request pipeline.
//!
//! # Algorithm
//! ```text
//! cached reachable? ── no ──▶ NetworkUnavailable
//!     │ yes
//!     ▼
//! ┌─▶ cancelled? ── yes ──▶ Cancelled
//! │   attempt > 1: probe ── down ──▶ NetworkUnavailable
//! │   send (deadline, cancellable)
//! │   classify
//! │     Success ──▶ response
//! │     Permanent ──▶ RequestFailed
//! │     Transient, budget spent ──▶ RetriesExhausted
//! └── Transient: backoff (cancellable)
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{ClientConfig, RetryConfig};
use crate::connectivity::ConnectivityOracle;
use crate::error::{PipelineError, PipelineResult, UnavailableReason};
use crate::observability::metrics;
use crate::resilience::classify::{classify, Outcome};
use crate::resilience::retries::RetryContext;
use crate::resilience::timeouts::with_deadline;
use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// Wraps a transport with pre-flight gating, retries and reprobing.
///
/// Cheap to share: every `execute` call keeps its own state on its own
/// stack, so any number may run concurrently.
pub struct ResilientPipeline<T> {
    transport: T,
    oracle: Arc<ConnectivityOracle>,
    retry_config: RetryConfig,
    attempt_timeout: Duration,
}

impl<T: Transport> ResilientPipeline<T> {
    pub fn new(transport: T, oracle: Arc<ConnectivityOracle>, retry_config: RetryConfig) -> Self {
        Self {
            transport,
            oracle,
            retry_config,
            attempt_timeout: Duration::from_secs(30),
        }
    }

    /// Build from a full client configuration.
    pub fn from_config(transport: T, oracle: Arc<ConnectivityOracle>, config: &ClientConfig) -> Self {
        Self::new(transport, oracle, config.retries.clone())
            .with_attempt_timeout(Duration::from_secs(config.transport.attempt_secs))
    }

    /// Deadline for one send, including reading the body.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn oracle(&self) -> &Arc<ConnectivityOracle> {
        &self.oracle
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run `request` to a single terminal result.
    pub async fn execute(
        &self,
        request: &TransportRequest,
        cancel: &CancellationToken,
    ) -> PipelineResult<TransportResponse> {
        let start = Instant::now();
        let span = tracing::info_span!(
            "execute",
            request_id = %Uuid::new_v4(),
            method = %request.method,
            url = %request.url,
        );

        let result = self.run(request, cancel).instrument(span).await;

        let label = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_request(label, start);
        result
    }

    async fn run(
        &self,
        request: &TransportRequest,
        cancel: &CancellationToken,
    ) -> PipelineResult<TransportResponse> {
        if !self.oracle.is_reachable_now() {
            tracing::debug!("Network unreachable at entry, not sending");
            return Err(PipelineError::NetworkUnavailable(UnavailableReason::AtEntry));
        }

        let mut ctx = RetryContext::new(request, &self.retry_config);

        loop {
            let attempt = ctx.begin_attempt();

            if cancel.is_cancelled() {
                tracing::debug!(attempt, "Cancelled before attempt");
                return Err(PipelineError::Cancelled);
            }

            if attempt > 1 {
                let reachable = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
                    reachable = self.oracle.probe_reachability() => reachable,
                };
                if !reachable {
                    tracing::warn!(attempt, "Connection lost between attempts, giving up");
                    return Err(PipelineError::NetworkUnavailable(
                        UnavailableReason::LostBetweenAttempts,
                    ));
                }
            }

            let send_cancel = cancel.child_token();
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
                result = with_deadline(
                    self.attempt_timeout,
                    self.transport.send(ctx.request(), &send_cancel),
                ) => result,
            };
            if matches!(result, Err(TransportError::Aborted)) && cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            let outcome = classify(result);
            metrics::record_attempt(outcome.label());

            match outcome {
                Outcome::Success(response) => {
                    tracing::debug!(attempt, status = %response.status, "Request succeeded");
                    return Ok(response);
                }
                Outcome::PermanentFailure(cause) => {
                    tracing::warn!(attempt, cause = %cause, "Request failed permanently");
                    return Err(PipelineError::RequestFailed(cause));
                }
                Outcome::TransientNetworkFailure(cause) => {
                    if ctx.is_exhausted() {
                        tracing::warn!(
                            attempts = ctx.attempt(),
                            cause = %cause,
                            "Request failed, retries exhausted"
                        );
                        return Err(PipelineError::RetriesExhausted {
                            attempts: ctx.attempt(),
                            last: cause,
                        });
                    }

                    let delay = ctx.backoff(&self.retry_config);
                    tracing::info!(
                        attempt,
                        max_attempts = ctx.max_attempts(),
                        delay = ?delay,
                        cause = %cause,
                        "Transient failure, retrying"
                    );
                    metrics::record_retry();

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}
