//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! ResilientPipeline (one attempt)
//!     → Transport::send(&request, &cancel)
//!     → http.rs (reqwest client, connect timeout, cancellation race)
//!     → TransportResponse | TransportError
//!     → resilience/classify.rs decides what the result means
//! ```
//!
//! # Design Decisions
//! - The transport never retries and never interprets status codes
//! - Requests are borrowed, so the same bytes go out on every attempt
//! - Errors keep the connect/timeout distinction the classifier needs

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

pub use http::HttpTransport;

/// A fully built, replayable outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Cleared for calls that must never be sent twice.
    pub retry: bool,
}

impl TransportRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            retry: true,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Limit this request to a single transport send.
    pub fn without_retry(mut self) -> Self {
        self.retry = false;
        self
    }
}

/// Raw result of one successful exchange, whatever the status.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport-level failures (no HTTP response was obtained).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection could not be established or was dropped mid-exchange.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The attempt did not complete within its deadline.
    #[error("attempt timed out")]
    Timeout,

    /// The caller's cancellation signal aborted the exchange.
    #[error("request aborted")]
    Aborted,

    /// The request could not be built or sent for a non-network reason.
    #[error("request error: {0}")]
    Request(String),

    /// The response body could not be read or decoded.
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl TransportError {
    /// Connect failures and timeouts are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Connect(_) | TransportError::Timeout)
    }
}

/// The raw send primitive the pipeline delegates to.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one exchange. Implementations should stop early when
    /// `cancel` fires and return [`TransportError::Aborted`].
    async fn send(
        &self,
        request: &TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        request: &TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        (**self).send(request, cancel).await
    }
}
