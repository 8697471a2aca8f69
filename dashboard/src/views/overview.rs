use agentic_core::agent::Agent;
use agentic_core::audit::AuditLogEntry;
use agentic_core::wallet::{NATIVE_SYMBOL, Wallet, format_amount, total_balance};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::Context;
use crate::error::ClientError;
use crate::session::Session;
use crate::state::{Loadable, Synced};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub wallets: Vec<Wallet>,
    pub agents: Vec<Agent>,
    pub recent: Vec<AuditLogEntry>,
}

/// Headline numbers on the dashboard landing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewStats {
    pub total_wallets: usize,
    pub active_agents: usize,
    pub recent_transactions: usize,
    pub total_balance: Decimal,
    pub total_balance_display: String,
}

impl OverviewStats {
    pub fn from_overview(overview: &Overview) -> Self {
        let total = total_balance(&overview.wallets, NATIVE_SYMBOL);
        Self {
            total_wallets: overview.wallets.len(),
            active_agents: overview.agents.len(),
            recent_transactions: overview.recent.len(),
            total_balance: total,
            total_balance_display: format_amount(total, NATIVE_SYMBOL),
        }
    }
}

pub struct OverviewView {
    ctx: Context,
    data: Synced<Overview>,
}

impl OverviewView {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            data: Synced::new(),
        }
    }

    pub async fn mount(&mut self, session: &Session) -> Result<(), ClientError> {
        self.load(session).await
    }

    /// Wallets, agents and the latest audit entries, fetched together.
    pub async fn load(&mut self, session: &Session) -> Result<(), ClientError> {
        let ticket = self.data.begin();
        let client = &self.ctx.client;
        let (wallets, agents, recent) = tokio::join!(
            client.list_wallets(session),
            client.list_agents(session),
            client.audit_logs(session, self.ctx.config.activity_page_size),
        );
        match (wallets, agents, recent) {
            (Ok(wallets), Ok(agents), Ok(recent)) => {
                let overview = Overview {
                    wallets,
                    agents,
                    recent,
                };
                self.data.apply(ticket, overview);
                Ok(())
            }
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                self.data.fail(ticket);
                self.ctx.toaster.failed(&e, "Failed to load dashboard data");
                Err(e)
            }
        }
    }

    pub fn state(&self) -> &Loadable<Overview> {
        self.data.state()
    }

    pub fn stats(&self) -> Option<OverviewStats> {
        self.data.get().map(OverviewStats::from_overview)
    }

    pub fn recent_activity(&self) -> &[AuditLogEntry] {
        self.data.get().map(|d| d.recent.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, agent_json, audit_json, context};
    use serde_json::json;

    #[tokio::test]
    async fn total_balance_sums_sol_across_wallets() {
        let transport = ScriptedTransport::new();
        transport.reply(
            "GET",
            "wallets",
            200,
            json!([{"wallet_id": "w1", "balances": {"SOL": 1.5}},
                   {"wallet_id": "w2", "balances": {"SOL": 0}}]),
        );
        transport.reply("GET", "agents", 200, json!([agent_json("a1", "Trader", "w1")]));
        transport.reply("GET", "audit/logs", 200, json!([audit_json("airdrop", true, 1)]));
        let mut view = OverviewView::new(context(&transport));
        view.mount(&Session::Anonymous).await.unwrap();

        let stats = view.stats().unwrap();
        assert_eq!(stats.total_balance_display, "1.5000 SOL");
        assert_eq!(
            (stats.total_wallets, stats.active_agents, stats.recent_transactions),
            (2, 1, 1)
        );
        assert!(transport.requests().iter().any(|r| r.url.query() == Some("limit=5")));
    }

    #[tokio::test]
    async fn any_failed_fetch_toasts_once() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", "wallets", 200, json!([]));
        transport.reply("GET", "agents", 200, json!([]));
        transport.fail("GET", "audit/logs", ClientError::Connection("reset".into()));
        let ctx = context(&transport);
        let mut view = OverviewView::new(ctx.clone());
        assert!(view.mount(&Session::Anonymous).await.is_err());
        assert_eq!(view.stats().unwrap().total_balance_display, "0.0000 SOL");
        let toasts = ctx.toaster.drain();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, "Failed to load dashboard data");
    }
}
