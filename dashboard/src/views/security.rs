use agentic_core::policy::{Policy, PolicyUpdate};
use agentic_core::wallet::Wallet;
use rust_decimal::Decimal;

use crate::Context;
use crate::error::ClientError;
use crate::session::Session;
use crate::state::{Loadable, Synced};

/// Per-wallet policy editor. The displayed policy is always the server's copy.
pub struct SecurityView {
    ctx: Context,
    wallets: Synced<Vec<Wallet>>,
    selected: Option<String>,
    policy: Synced<Option<Policy>>,
}

impl SecurityView {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            wallets: Synced::new(),
            selected: None,
            policy: Synced::new(),
        }
    }

    pub async fn mount(&mut self, session: &Session) -> Result<(), ClientError> {
        let ticket = self.wallets.begin();
        match self.ctx.client.list_wallets(session).await {
            Ok(wallets) => {
                self.wallets.apply(ticket, wallets);
                Ok(())
            }
            Err(e) => {
                self.wallets.fail(ticket);
                self.ctx.toaster.failed(&e, "Failed to load wallets");
                Err(e)
            }
        }
    }

    pub fn wallets(&self) -> &[Wallet] {
        self.wallets.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Policy of the selected wallet; `Ready(None)` when it could not be loaded.
    pub fn policy(&self) -> &Loadable<Option<Policy>> {
        self.policy.state()
    }

    /// Switch wallets. Whatever was shown for the previous one is discarded.
    pub async fn select_wallet(
        &mut self,
        session: &Session,
        wallet_id: &str,
    ) -> Result<(), ClientError> {
        self.selected = Some(wallet_id.to_string());
        self.policy.reset();
        self.load_policy(session).await
    }

    pub async fn load_policy(&mut self, session: &Session) -> Result<(), ClientError> {
        let Some(wallet_id) = self.selected.clone() else {
            return Ok(());
        };
        let ticket = self.policy.begin();
        match self.ctx.client.get_policy(session, &wallet_id).await {
            Ok(policy) if self.selected.as_deref() == Some(policy.wallet_id.as_str()) => {
                self.policy.apply(ticket, Some(policy));
                Ok(())
            }
            Ok(policy) => {
                tracing::debug!(
                    wallet_id = %policy.wallet_id,
                    "dropping policy for a wallet that is no longer selected"
                );
                Ok(())
            }
            Err(e) => {
                self.policy.fail(ticket);
                self.ctx.toaster.failed(&e, "Failed to load policy");
                Err(e)
            }
        }
    }

    /// Submit a new daily spend limit, then re-read the policy from the server.
    pub async fn update_max_daily_spend(
        &mut self,
        session: &Session,
        max_daily_spend: &str,
    ) -> Result<(), ClientError> {
        let update = match self.policy_update(max_daily_spend) {
            Ok(update) => update,
            Err(e) => {
                self.ctx.toaster.failed(&e, "");
                return Err(e);
            }
        };
        if let Err(e) = self.ctx.client.update_policy(session, &update).await {
            self.ctx.toaster.failed(&e, "Failed to update policy");
            return Err(e);
        }
        tracing::info!(wallet_id = %update.wallet_id, "policy updated");
        self.ctx.toaster.success("Policy updated successfully");
        self.load_policy(session).await
    }

    fn policy_update(&self, raw: &str) -> Result<PolicyUpdate, ClientError> {
        let (Some(wallet_id), false) = (&self.selected, raw.trim().is_empty()) else {
            return Err(ClientError::Validation(
                "Please select a wallet and enter spend limit".to_string(),
            ));
        };
        let max_daily_spend = match raw.trim().parse::<Decimal>() {
            Ok(v) if v >= Decimal::ZERO => v,
            _ => {
                return Err(ClientError::Validation(
                    "Spend limit must be a non-negative number".to_string(),
                ));
            }
        };
        Ok(PolicyUpdate {
            wallet_id: wallet_id.clone(),
            max_daily_spend: Some(max_daily_spend),
            allowed_actions: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, context, wallet_json};
    use serde_json::json;

    fn policy_json(wallet_id: &str, max: f64) -> serde_json::Value {
        json!({
            "wallet_id": wallet_id, "max_daily_spend": max,
            "allowed_actions": ["transfer", "swap"], "require_simulation": true
        })
    }

    #[tokio::test]
    async fn update_rereads_policy_from_server() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", "wallets", 200, json!([wallet_json("w1", "Treasury", 1.0)]));
        transport.reply("GET", "policies/w1", 200, policy_json("w1", 10.0));
        transport.reply("GET", "policies/w1", 200, policy_json("w1", 2.5));
        transport.reply("POST", "policies", 200, policy_json("w1", 2.5));
        let mut view = SecurityView::new(context(&transport));
        let session = Session::Anonymous;

        view.mount(&session).await.unwrap();
        view.select_wallet(&session, "w1").await.unwrap();
        view.update_max_daily_spend(&session, "2.5").await.unwrap();

        let policy = view.policy().ready().cloned().flatten().unwrap();
        assert_eq!(policy.max_daily_spend, Decimal::new(25, 1));
        assert_eq!(policy.allowed_actions, vec!["transfer", "swap"]);
        assert_eq!(
            transport.last_body("POST", "policies"),
            Some(json!({"wallet_id": "w1", "max_daily_spend": 2.5}))
        );
        assert_eq!(transport.count("GET", "policies/w1"), 2);
    }

    #[tokio::test]
    async fn update_without_selection_sends_nothing() {
        let transport = ScriptedTransport::new();
        let mut view = SecurityView::new(context(&transport));
        let err = view
            .update_max_daily_spend(&Session::Anonymous, "5")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please select a wallet and enter spend limit");
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn negative_limit_is_rejected() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", "policies/w1", 200, policy_json("w1", 10.0));
        let mut view = SecurityView::new(context(&transport));
        view.select_wallet(&Session::Anonymous, "w1").await.unwrap();
        assert!(view
            .update_max_daily_spend(&Session::Anonymous, "-1")
            .await
            .is_err());
        assert_eq!(transport.count("POST", "policies"), 0);
    }

    #[tokio::test]
    async fn policy_for_another_wallet_is_dropped() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", "policies/w2", 200, policy_json("w1", 10.0));
        let mut view = SecurityView::new(context(&transport));
        view.select_wallet(&Session::Anonymous, "w2").await.unwrap();
        assert!(view.policy().is_loading());
    }

    #[tokio::test]
    async fn switching_wallet_clears_previous_policy() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", "policies/w1", 200, policy_json("w1", 10.0));
        transport.reply("GET", "policies/w2", 404, json!({"detail": "Policy not found"}));
        let ctx = context(&transport);
        let mut view = SecurityView::new(ctx.clone());
        view.select_wallet(&Session::Anonymous, "w1").await.unwrap();
        assert!(view.select_wallet(&Session::Anonymous, "w2").await.is_err());
        assert_eq!(view.policy(), &Loadable::Ready(None));
        assert_eq!(ctx.toaster.drain()[0].message, "Failed to load policy");
    }
}
