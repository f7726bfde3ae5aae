//! Retry bookkeeping.
//!
//! # Responsibilities
//! - Decide how many sends a request may consume
//! - Track the attempt count for one `execute` call
//! - Hand out the backoff delay for the current attempt
//!
//! # Design Decisions
//! - One context per call, never shared between calls
//! - The context borrows the request, so every attempt replays it unmodified
//! - Non-idempotent methods are retried unless the policy or request opts out

use std::time::Duration;

use reqwest::Method;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;
use crate::transport::TransportRequest;

/// Whether a method may safely be repeated.
pub fn is_idempotent(method: &Method) -> bool {
    method.is_idempotent()
}

/// Number of sends allowed for `request` under `config`.
pub fn attempt_budget(config: &RetryConfig, request: &TransportRequest) -> u32 {
    let max_attempts = config.max_attempts.max(1);
    if !request.retry {
        return 1;
    }
    if !config.retry_non_idempotent && !is_idempotent(&request.method) {
        return 1;
    }
    max_attempts
}

/// Per-call retry state.
#[derive(Debug)]
pub struct RetryContext<'a> {
    request: &'a TransportRequest,
    attempt: u32,
    max_attempts: u32,
}

impl<'a> RetryContext<'a> {
    pub fn new(request: &'a TransportRequest, config: &RetryConfig) -> Self {
        Self {
            request,
            attempt: 0,
            max_attempts: attempt_budget(config, request),
        }
    }

    /// Start the next attempt and return its 1-based number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// No further attempts may be made.
    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Delay to wait before the next attempt.
    pub fn backoff(&self, config: &RetryConfig) -> Duration {
        calculate_backoff(self.attempt, config)
    }

    /// The original request, unchanged.
    pub fn request(&self) -> &'a TransportRequest {
        self.request
    }
}
