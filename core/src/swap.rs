use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supported tokens as returned by `GET /swap/tokens`: symbol -> mint address.
pub type TokenList = BTreeMap<String, String>;

/// Decimals the backend assumes when converting a quote amount to base units.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 9;

/// Slippage tolerance sent with swap executions, in basis points.
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;

/// Body of `POST /swap/quote`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: Decimal,
    pub token_decimals: u8,
}

/// Raw response of `POST /swap/quote`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteResponse {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub amount_in: Option<Decimal>,
    #[serde(default)]
    pub amount_out: Option<Decimal>,
    #[serde(default)]
    pub price_impact: Option<Decimal>,
    #[serde(default)]
    pub error: Option<String>,
}

/// An advisory quote for the pair and amount it was requested for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub input_mint: String,
    pub output_mint: String,
    pub amount_in: Decimal,
    pub amount_out: Decimal,
    /// Percent
    pub price_impact: Decimal,
}

impl SwapQuote {
    /// Accept a quote response for `request`, or return the reason it was rejected.
    pub fn from_response(request: &QuoteRequest, resp: QuoteResponse) -> Result<Self, String> {
        if !resp.valid {
            return Err(resp.error.unwrap_or_else(|| "Failed to get quote".to_string()));
        }
        let amount_out = resp
            .amount_out
            .ok_or_else(|| "Quote response is missing amount_out".to_string())?;
        Ok(Self {
            input_mint: request.input_mint.clone(),
            output_mint: request.output_mint.clone(),
            amount_in: resp.amount_in.unwrap_or(request.amount),
            amount_out,
            price_impact: resp.price_impact.unwrap_or(Decimal::ZERO),
        })
    }

    /// Output units per input unit.
    pub fn rate(&self) -> Option<Decimal> {
        if self.amount_in.is_zero() {
            None
        } else {
            self.amount_out.checked_div(self.amount_in).map(|r| r.round_dp(6))
        }
    }

    /// Impact above one percent is flagged to the user.
    pub fn is_high_impact(&self) -> bool {
        self.price_impact.abs() > Decimal::ONE
    }
}

/// Body of `POST /swap/execute`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteSwapRequest {
    pub wallet_id: String,
    pub input_mint: String,
    pub output_mint: String,
    pub amount: Decimal,
    pub slippage_bps: u16,
}

/// Response of `POST /swap/execute`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwapResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_transaction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
