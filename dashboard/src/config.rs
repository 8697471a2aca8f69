use std::time::Duration;

use agentic_core::swap::{DEFAULT_SLIPPAGE_BPS, DEFAULT_TOKEN_DECIMALS};
use rust_decimal::Decimal;

use crate::settle::SettlePolicy;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8001";
pub const BACKEND_URL_ENV: &str = "AGENTIC_BACKEND_URL";
pub const AUDIT_POLL_SECS_ENV: &str = "AGENTIC_AUDIT_POLL_SECS";
pub const AUDIT_PAGE_SIZE_ENV: &str = "AGENTIC_AUDIT_PAGE_SIZE";

const AUDIT_POLL_SECS: u64 = 5;
const AUDIT_POLL_SECS_MIN: u64 = 1;
const AUDIT_POLL_SECS_MAX: u64 = 300;
const AUDIT_PAGE_SIZE: u32 = 50;
const AUDIT_PAGE_SIZE_MIN: u32 = 1;
const AUDIT_PAGE_SIZE_MAX: u32 = 500;
const ACTIVITY_PAGE_SIZE: u32 = 5;

/// Tunables shared by every view.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend origin; resources live under `<backend_url>/api`
    pub backend_url: String,
    pub audit_poll_interval: Duration,
    /// Entries fetched per transactions poll
    pub audit_page_size: u32,
    /// Entries shown as recent activity on the overview
    pub activity_page_size: u32,
    /// Amount used when test-driving an agent decision
    pub agent_test_amount: Decimal,
    pub slippage_bps: u16,
    pub token_decimals: u8,
    /// Balance refresh after an airdrop
    pub settle: SettlePolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            audit_poll_interval: Duration::from_secs(AUDIT_POLL_SECS),
            audit_page_size: AUDIT_PAGE_SIZE,
            activity_page_size: ACTIVITY_PAGE_SIZE,
            agent_test_amount: Decimal::new(5, 2),
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
            token_decimals: DEFAULT_TOKEN_DECIMALS,
            settle: SettlePolicy::default(),
        }
    }
}

impl DashboardConfig {
    pub fn with_backend_url(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `AGENTIC_*` environment variables.
    pub fn from_env() -> Self {
        parse_config_from_raw(
            std::env::var(BACKEND_URL_ENV).ok(),
            std::env::var(AUDIT_POLL_SECS_ENV).ok(),
            std::env::var(AUDIT_PAGE_SIZE_ENV).ok(),
        )
    }
}

fn parse_env_u64_with_bounds(raw: Option<String>, min: u64, max: u64, default: u64) -> u64 {
    match raw.and_then(|value| value.trim().parse::<u64>().ok()) {
        Some(parsed) => parsed.clamp(min, max),
        None => default,
    }
}

fn parse_env_u32_with_bounds(raw: Option<String>, min: u32, max: u32, default: u32) -> u32 {
    match raw.and_then(|value| value.trim().parse::<u32>().ok()) {
        Some(parsed) => parsed.clamp(min, max),
        None => default,
    }
}

fn parse_config_from_raw(
    backend_raw: Option<String>,
    poll_raw: Option<String>,
    page_raw: Option<String>,
) -> DashboardConfig {
    let defaults = DashboardConfig::default();
    let backend_url = backend_raw
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(defaults.backend_url.clone());
    let poll_secs = parse_env_u64_with_bounds(
        poll_raw,
        AUDIT_POLL_SECS_MIN,
        AUDIT_POLL_SECS_MAX,
        AUDIT_POLL_SECS,
    );
    let page_size = parse_env_u32_with_bounds(
        page_raw,
        AUDIT_PAGE_SIZE_MIN,
        AUDIT_PAGE_SIZE_MAX,
        AUDIT_PAGE_SIZE,
    );
    DashboardConfig {
        backend_url,
        audit_poll_interval: Duration::from_secs(poll_secs),
        audit_page_size: page_size,
        ..defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_dashboard_behavior() {
        let config = DashboardConfig::default();
        assert_eq!(config.audit_poll_interval, Duration::from_secs(5));
        assert_eq!(config.audit_page_size, 50);
        assert_eq!(config.activity_page_size, 5);
        assert_eq!(config.agent_test_amount, Decimal::new(5, 2));
        assert_eq!(config.slippage_bps, 50);
        assert_eq!(config.token_decimals, 9);
    }

    #[test]
    fn raw_values_are_clamped() {
        let config = parse_config_from_raw(
            Some("https://wallet.example/".to_string()),
            Some("0".to_string()),
            Some("10000".to_string()),
        );
        assert_eq!(config.backend_url, "https://wallet.example");
        assert_eq!(config.audit_poll_interval, Duration::from_secs(1));
        assert_eq!(config.audit_page_size, 500);
    }

    #[test]
    fn unparsable_values_fall_back_to_defaults() {
        let config = parse_config_from_raw(Some("  ".to_string()), Some("soon".to_string()), None);
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.audit_poll_interval, Duration::from_secs(5));
        assert_eq!(config.audit_page_size, 50);
    }
}
