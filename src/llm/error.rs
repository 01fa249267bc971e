//! Error types for the upstream gateway

use thiserror::Error;

/// Errors surfaced by the upstream chat-completion API
///
/// The gateway performs no retries; callers decide what an upstream failure
/// means for the request they are serving.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    Http { status: u16, body: String },

    /// SSE stream transport or framing failures
    #[error("Stream error: {0}")]
    Stream(String),

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upstream answered with a body the protocol does not allow
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

// Implement conversion from common error types
impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        UpstreamError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            UpstreamError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            UpstreamError::Http {
                status: 0,
                body: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error() {
        let err = UpstreamError::Http {
            status: 429,
            body: "Too many requests".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn test_stream_error() {
        let err = UpstreamError::Stream("connection reset".to_string());
        assert!(err.to_string().contains("Stream error"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_invalid_response() {
        let err = UpstreamError::InvalidResponse("no choices".to_string());
        assert!(err.to_string().contains("Invalid response"));
    }

    #[test]
    fn test_from_serde_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let upstream_err: UpstreamError = json_err.into();
        assert!(matches!(upstream_err, UpstreamError::Serialization(_)));
    }
}
