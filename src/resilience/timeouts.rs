//! Per-attempt deadline enforcement.

use std::future::Future;
use std::time::Duration;

use crate::transport::TransportError;

/// Run one transport exchange under `limit`, mapping expiry to
/// [`TransportError::Timeout`] so it classifies as transient.
pub async fn with_deadline<F, T>(limit: Duration, exchange: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(limit, exchange).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(limit = ?limit, "Attempt deadline elapsed");
            Err(TransportError::Timeout)
        }
    }
}
