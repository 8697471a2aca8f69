use agentic_core::error::codes;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Every way a dashboard operation can fail.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Caught before any request was sent
    #[error("{0}")]
    Validation(String),
    /// Endpoint needs a session and there is none; nothing was sent
    #[error("not logged in")]
    Unauthenticated,
    /// Bearer expired before use; nothing was sent
    #[error("session expired at {expired_at}, log in again")]
    SessionExpired { expired_at: DateTime<Utc> },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("request failed with status {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
    /// 2xx response whose payload reports failure (failed airdrop, invalid quote...)
    #[error("{0}")]
    Rejected(String),
    /// The held quote was computed for a different pair or amount
    #[error("quote no longer matches the current selection")]
    StaleQuote,
    #[error("session storage: {0}")]
    Persistence(String),
}

impl ClientError {
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Validation(_) | ClientError::Config(_) => codes::VALIDATION_FAILED,
            ClientError::Unauthenticated => codes::UNAUTHENTICATED,
            ClientError::SessionExpired { .. } => codes::SESSION_EXPIRED,
            ClientError::Connection(_) => codes::CONNECTION_ERROR,
            ClientError::Status { .. } => codes::REQUEST_FAILED,
            ClientError::Decode(_) => codes::DECODE_FAILED,
            ClientError::Rejected(_) => codes::REJECTED,
            ClientError::StaleQuote => codes::STALE_QUOTE,
            ClientError::Persistence(_) => codes::PERSISTENCE_ERROR,
        }
    }

    /// Server-side detail message, when the backend sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True for failures that happened before anything went over the wire.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_)
                | ClientError::Unauthenticated
                | ClientError::SessionExpired { .. }
                | ClientError::Config(_)
                | ClientError::StaleQuote
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_includes_detail() {
        let err = ClientError::Status {
            status: 404,
            detail: Some("Wallet not found".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "request failed with status 404: Wallet not found"
        );
        assert_eq!(err.detail(), Some("Wallet not found"));
        assert_eq!(err.code(), "request_failed");
    }

    #[test]
    fn local_failures_are_flagged() {
        assert!(ClientError::Validation("x".into()).is_local());
        assert!(ClientError::StaleQuote.is_local());
        assert!(!ClientError::Connection("refused".into()).is_local());
    }
}
