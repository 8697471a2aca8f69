use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body the backend returns with non-success statuses.
///
/// `detail` is a plain string for handled errors and a list of
/// `{loc, msg, type}` objects when request validation failed server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ApiErrorBody {
    /// Human-readable message carried by the body, if any.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }
}

/// Extract the `detail` message from an arbitrary response body.
pub fn detail_message(body: &Value) -> Option<String> {
    serde_json::from_value::<ApiErrorBody>(body.clone())
        .ok()
        .and_then(|b| b.message())
}

/// Machine-readable error codes used in CLI error output
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const UNAUTHENTICATED: &str = "unauthenticated";
    pub const SESSION_EXPIRED: &str = "session_expired";
    pub const CONNECTION_ERROR: &str = "connection_error";
    pub const REQUEST_FAILED: &str = "request_failed";
    pub const DECODE_FAILED: &str = "decode_failed";
    pub const REJECTED: &str = "rejected";
    pub const STALE_QUOTE: &str = "stale_quote";
    pub const PERSISTENCE_ERROR: &str = "persistence_error";
}
