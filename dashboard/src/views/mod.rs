//! One model per screen. Views own their snapshot, fetch on mount, and reload the
//! whole collection after every successful action.

pub mod agents;
pub mod auth;
pub mod overview;
pub mod security;
pub mod swap;
pub mod transactions;
pub mod wallets;

pub use agents::AgentsView;
pub use auth::AuthView;
pub use overview::{OverviewStats, OverviewView};
pub use security::SecurityView;
pub use swap::SwapView;
pub use transactions::TransactionsView;
pub use wallets::WalletsView;

use rust_decimal::Decimal;

use crate::error::ClientError;

/// Parse a user-entered amount that must be strictly positive.
pub fn parse_positive_amount(raw: &str, field: &str) -> Result<Decimal, ClientError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ClientError::Validation(format!("Please enter {field}")));
    }
    match raw.parse::<Decimal>() {
        Ok(v) if v > Decimal::ZERO => Ok(v),
        _ => Err(ClientError::Validation(format!(
            "{} must be a positive number",
            capitalize(field)
        ))),
    }
}

fn capitalize(s: &str) -> String {
    let s = s.strip_prefix("an ").or_else(|| s.strip_prefix("a ")).unwrap_or(s);
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
