use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Symbol of the chain's native currency, the only balance the backend reports today.
pub const NATIVE_SYMBOL: &str = "SOL";

/// How the backend keeps a wallet's private key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyManagement {
    /// Key encrypted at rest on the server
    #[default]
    Encrypted,
    /// Key kept base64-encoded for ephemeral signing
    Ephemeral,
}

impl KeyManagement {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyManagement::Encrypted => "encrypted",
            KeyManagement::Ephemeral => "ephemeral",
        }
    }
}

impl fmt::Display for KeyManagement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyManagement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "encrypted" => Ok(KeyManagement::Encrypted),
            "ephemeral" => Ok(KeyManagement::Ephemeral),
            other => Err(format!(
                "unknown key management mode '{other}' (expected 'encrypted' or 'ephemeral')"
            )),
        }
    }
}

/// A custodial wallet as listed by `GET /wallets`.
///
/// Balances are whatever the backend last reported. They are never computed
/// client-side and only change when the list is reloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub wallet_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pubkey: String,
    #[serde(default)]
    pub key_management_type: KeyManagement,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub balances: Option<BTreeMap<String, Decimal>>,
}

impl Wallet {
    /// Balance for `symbol`, zero when the backend reported none.
    pub fn balance(&self, symbol: &str) -> Decimal {
        self.balances
            .as_ref()
            .and_then(|b| b.get(symbol).copied())
            .unwrap_or(Decimal::ZERO)
    }

    pub fn native_balance(&self) -> Decimal {
        self.balance(NATIVE_SYMBOL)
    }
}

/// Body of `POST /wallets`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWalletRequest {
    pub name: String,
    pub key_management_type: KeyManagement,
}

/// Response of `POST /wallets/{id}/fund` (test-network airdrop).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sum of every wallet's `symbol` balance.
pub fn total_balance(wallets: &[Wallet], symbol: &str) -> Decimal {
    wallets.iter().map(|w| w.balance(symbol)).sum()
}

/// Render an amount the way the dashboard shows balances: four decimals and the symbol.
pub fn format_amount(amount: Decimal, symbol: &str) -> String {
    format!("{:.4} {symbol}", amount.round_dp(4))
}
