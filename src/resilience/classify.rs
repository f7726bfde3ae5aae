//! Outcome classification for a single attempt.
//!
//! # Rules
//! ```text
//! status < 400                         → Success
//! 408, 502, 503, 504                   → TransientNetworkFailure
//! connect error, attempt timeout       → TransientNetworkFailure
//! any other 4xx/5xx, other transport   → PermanentFailure
//! ```
//!
//! Classification looks only at the result in hand, never at history.

use reqwest::StatusCode;
use thiserror::Error;

use crate::transport::{TransportError, TransportResponse};

/// Longest body excerpt kept on a status failure.
const BODY_EXCERPT_LIMIT: usize = 512;

/// What went wrong with an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// The server answered with an error status.
    #[error("server responded with {status}")]
    Status { status: StatusCode, body: String },

    /// No response was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl FailureCause {
    fn from_response(response: &TransportResponse) -> Self {
        let mut body = response.text();
        if body.len() > BODY_EXCERPT_LIMIT {
            let mut cut = BODY_EXCERPT_LIMIT;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        FailureCause::Status {
            status: response.status,
            body,
        }
    }
}

/// Tagged result of one attempt.
#[derive(Debug)]
pub enum Outcome {
    Success(TransportResponse),
    TransientNetworkFailure(FailureCause),
    PermanentFailure(FailureCause),
}

impl Outcome {
    /// Label used for attempt metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::TransientNetworkFailure(_) => "transient",
            Outcome::PermanentFailure(_) => "permanent",
        }
    }
}

/// Statuses that indicate temporary network or upstream unavailability.
pub fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Classify the raw result of one transport send.
pub fn classify(result: Result<TransportResponse, TransportError>) -> Outcome {
    match result {
        Ok(response) if is_transient_status(response.status) => {
            Outcome::TransientNetworkFailure(FailureCause::from_response(&response))
        }
        Ok(response) if response.status.is_client_error() || response.status.is_server_error() => {
            Outcome::PermanentFailure(FailureCause::from_response(&response))
        }
        Ok(response) => Outcome::Success(response),
        Err(err) if err.is_transient() => Outcome::TransientNetworkFailure(err.into()),
        Err(err) => Outcome::PermanentFailure(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> Outcome {
        let status = StatusCode::from_u16(code).unwrap();
        classify(Ok(TransportResponse::new(status, "body")))
    }

    #[test]
    fn test_success_statuses() {
        for code in [200, 201, 204, 304] {
            assert!(matches!(status(code), Outcome::Success(_)), "{code}");
        }
    }

    #[test]
    fn test_transient_statuses() {
        for code in [408, 502, 503, 504] {
            assert!(matches!(status(code), Outcome::TransientNetworkFailure(_)), "{code}");
        }
    }

    #[test]
    fn test_permanent_statuses() {
        for code in [400, 401, 403, 404, 409, 429, 500, 501] {
            assert!(matches!(status(code), Outcome::PermanentFailure(_)), "{code}");
        }
    }

    #[test]
    fn test_transport_errors() {
        assert!(matches!(
            classify(Err(TransportError::Connect("reset".into()))),
            Outcome::TransientNetworkFailure(_)
        ));
        assert!(matches!(
            classify(Err(TransportError::Timeout)),
            Outcome::TransientNetworkFailure(_)
        ));
        assert!(matches!(
            classify(Err(TransportError::Request("builder".into()))),
            Outcome::PermanentFailure(_)
        ));
    }

    #[test]
    fn test_status_cause_keeps_body_excerpt() {
        let long = "é".repeat(400);
        let outcome = classify(Ok(TransportResponse::new(StatusCode::CONFLICT, long)));
        match outcome {
            Outcome::PermanentFailure(FailureCause::Status { status, body }) => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert!(body.len() <= BODY_EXCERPT_LIMIT);
                assert!(body.starts_with('é'));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
