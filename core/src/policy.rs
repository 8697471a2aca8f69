use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-wallet spending policy, enforced by the backend and only edited here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub wallet_id: String,
    pub max_daily_spend: Decimal,
    #[serde(default)]
    pub allowed_actions: Vec<String>,
    #[serde(default)]
    pub require_simulation: bool,
}

/// Body of `POST /policies`. Omitted fields are left untouched server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyUpdate {
    pub wallet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_daily_spend: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_actions: Option<Vec<String>>,
}
