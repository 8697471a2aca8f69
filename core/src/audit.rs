use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cluster the explorer links point at.
pub const EXPLORER_CLUSTER: &str = "devnet";

/// One entry of the server's append-only audit log. Read-only from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<String>,
    pub action_type: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Transaction signature recorded in the result, if the action reached the chain.
    pub fn signature(&self) -> Option<&str> {
        self.result
            .get("signature")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Amount parameter of the action, if it had one.
    pub fn amount(&self) -> Option<Decimal> {
        match self.params.get("amount")? {
            Value::Number(n) => n.to_string().parse().ok(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn explorer_url(&self) -> Option<String> {
        self.signature().map(explorer_url)
    }
}

pub fn explorer_url(signature: &str) -> String {
    format!("https://explorer.solana.com/tx/{signature}?cluster={EXPLORER_CLUSTER}")
}

/// Client-side outcome filter over a fetched page of audit entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeFilter {
    #[default]
    All,
    Success,
    Failed,
}

impl OutcomeFilter {
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        match self {
            OutcomeFilter::All => true,
            OutcomeFilter::Success => entry.success,
            OutcomeFilter::Failed => !entry.success,
        }
    }

    pub fn apply<'a>(&self, entries: &'a [AuditLogEntry]) -> Vec<&'a AuditLogEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

impl fmt::Display for OutcomeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutcomeFilter::All => "all",
            OutcomeFilter::Success => "success",
            OutcomeFilter::Failed => "failed",
        })
    }
}

impl FromStr for OutcomeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(OutcomeFilter::All),
            "success" | "successful" => Ok(OutcomeFilter::Success),
            "failed" | "failure" => Ok(OutcomeFilter::Failed),
            other => Err(format!(
                "unknown filter '{other}' (expected 'all', 'success' or 'failed')"
            )),
        }
    }
}

/// Outcome counts over a fetched page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl AuditStats {
    pub fn from_entries(entries: &[AuditLogEntry]) -> Self {
        let successful = entries.iter().filter(|e| e.success).count();
        Self {
            total: entries.len(),
            successful,
            failed: entries.len() - successful,
        }
    }
}
