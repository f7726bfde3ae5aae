//! `reqwest`-backed transport.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::TransportConfig;
use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// HTTP transport over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client honoring the configured connect timeout and user agent.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &TransportRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let exchange = async {
            let response = builder.send().await.map_err(map_reqwest_error)?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(map_reqwest_error)?;

            Ok(TransportResponse {
                status,
                headers,
                body: body.to_vec(),
            })
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Aborted),
            result = exchange => result,
        }
    }
}

/// Map a `reqwest` error onto the transport taxonomy.
///
/// Builder, redirect and decode problems are about the request or payload
/// itself. Everything else failed on the wire (connect, send, reading the
/// body) and is reported as a connection failure.
fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() || err.is_redirect() {
        TransportError::Request(err.to_string())
    } else if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_decode() && !has_io_source(&err) {
        TransportError::Body(err.to_string())
    } else {
        TransportError::Connect(err.to_string())
    }
}

fn has_io_source(err: &(dyn StdError + 'static)) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        if inner.is::<std::io::Error>() {
            return true;
        }
        source = inner.source();
    }
    false
}
