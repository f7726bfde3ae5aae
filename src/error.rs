//! Terminal errors surfaced by the request pipeline.

use std::fmt;

use thiserror::Error;

use crate::resilience::classify::FailureCause;

/// Why the pipeline decided the network was unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    /// The cached state said unreachable before any send.
    AtEntry,
    /// A reprobe between attempts confirmed the network was lost.
    LostBetweenAttempts,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::AtEntry => write!(f, "no connection available"),
            UnavailableReason::LostBetweenAttempts => write!(f, "connection lost between attempts"),
        }
    }
}

/// Errors returned by [`ResilientPipeline::execute`](crate::resilience::ResilientPipeline::execute).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// No attempt possible, or connectivity confirmed lost.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(UnavailableReason),

    /// The transport produced a non-retryable failure.
    #[error("request failed: {0}")]
    RequestFailed(FailureCause),

    /// Every attempt failed transiently.
    #[error("request failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: FailureCause },

    /// The caller's cancellation signal fired.
    #[error("request cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::NetworkUnavailable(_) => "network_unavailable",
            PipelineError::RequestFailed(_) => "request_failed",
            PipelineError::RetriesExhausted { .. } => "retries_exhausted",
            PipelineError::Cancelled => "cancelled",
        }
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
