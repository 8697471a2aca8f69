use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        })
    }
}

/// A transient, user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: Level,
    pub message: String,
}

/// Shared notification sink. Clones push to the same queue.
#[derive(Debug, Clone, Default)]
pub struct Toaster(Arc<Mutex<Vec<Toast>>>);

impl Toaster {
    fn push(&self, level: Level, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Error | Level::Warning => tracing::warn!(%level, %message, "toast"),
            Level::Success | Level::Info => tracing::info!(%level, %message, "toast"),
        }
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Toast { level, message });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(Level::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    /// Error toast for a failed operation, worded by `failure`.
    pub fn failed(&self, err: &ClientError, fallback: &str) {
        self.error(failure(err, fallback));
    }

    /// Take every pending toast.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    pub fn snapshot(&self) -> Vec<Toast> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// User-facing wording of an error. Local and rejected failures carry their own
/// message; transport and server failures get the operation's generic one.
pub fn failure(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::Validation(msg) | ClientError::Rejected(msg) => msg.clone(),
        ClientError::SessionExpired { .. } => "Session expired, log in again".to_string(),
        ClientError::Unauthenticated => "Log in to continue".to_string(),
        ClientError::StaleQuote => "Quote is out of date, get a new quote".to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_queue() {
        let toaster = Toaster::default();
        let other = toaster.clone();
        other.success("Wallet created successfully!");
        toaster.error("Failed to load wallets");
        let drained = toaster.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].level, Level::Success);
        assert!(other.snapshot().is_empty());
    }

    #[test]
    fn server_failures_use_the_operation_message() {
        let err = ClientError::Status {
            status: 500,
            detail: Some("Traceback...".to_string()),
        };
        assert_eq!(failure(&err, "Failed to create wallet"), "Failed to create wallet");
        assert_eq!(
            failure(&ClientError::Validation("Please enter a wallet name".into()), "x"),
            "Please enter a wallet name"
        );
    }
}
