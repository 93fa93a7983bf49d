use reqwest::{header::InvalidHeaderValue, StatusCode};
use thiserror::Error;

/// Failure of a single call against the service
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response at all: connection refused, DNS, timeout...
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected response body from {path}: {source}")]
    Decode {
        path: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("login response did not contain a token")]
    MissingToken,

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl ApiError {
    /// HTTP status, when the service answered with an error status
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, when the service answered at all
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } | ApiError::Decode { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_exposes_status_and_body() {
        let error = ApiError::Status {
            path: "/performance-test/stats".to_string(),
            status: StatusCode::FORBIDDEN,
            body: r#"{"error":"Forbidden"}"#.to_string(),
        };
        assert_eq!(error.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(error.body(), Some(r#"{"error":"Forbidden"}"#));
        assert_eq!(
            error.to_string(),
            "/performance-test/stats returned HTTP 403 Forbidden"
        );
    }

    #[test]
    fn test_decode_error_keeps_body() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let error = ApiError::Decode {
            path: "/auth/login".to_string(),
            body: "<html>".to_string(),
            source,
        };
        assert!(error.status().is_none());
        assert_eq!(error.body(), Some("<html>"));
    }

    #[test]
    fn test_missing_token_has_no_details() {
        assert!(ApiError::MissingToken.status().is_none());
        assert!(ApiError::MissingToken.body().is_none());
    }
}
