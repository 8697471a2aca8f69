use agentic_core::wallet::{CreateWalletRequest, FundResult, KeyManagement, NATIVE_SYMBOL, Wallet};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::Context;
use crate::error::ClientError;
use crate::session::Session;
use crate::settle::poll_until_settled;
use crate::state::{Loadable, Synced};

/// What happened after an accepted airdrop.
#[derive(Debug, Clone, Serialize)]
pub struct FundOutcome {
    pub result: FundResult,
    /// Whether the new balance showed up before the settle attempts ran out
    pub settled: bool,
    pub attempts: u32,
}

pub struct WalletsView {
    ctx: Context,
    wallets: Synced<Vec<Wallet>>,
}

impl WalletsView {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            wallets: Synced::new(),
        }
    }

    pub async fn mount(&mut self, session: &Session) -> Result<(), ClientError> {
        self.load(session).await
    }

    pub async fn load(&mut self, session: &Session) -> Result<(), ClientError> {
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

    pub async fn refresh(&mut self, session: &Session) -> Result<(), ClientError> {
        self.ctx.toaster.info("Refreshing wallet balance...");
        self.load(session).await
    }

    pub fn state(&self) -> &Loadable<Vec<Wallet>> {
        self.wallets.state()
    }

    pub fn wallets(&self) -> &[Wallet] {
        self.wallets.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, wallet_id: &str) -> Option<&Wallet> {
        self.wallets().iter().find(|w| w.wallet_id == wallet_id)
    }

    /// Create a wallet, then reload the list. The new record is never inserted locally.
    pub async fn create(
        &mut self,
        session: &Session,
        name: &str,
        key_management: KeyManagement,
    ) -> Result<Wallet, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            let err = ClientError::Validation("Please enter a wallet name".to_string());
            self.ctx.toaster.failed(&err, "");
            return Err(err);
        }
        let request = CreateWalletRequest {
            name: name.to_string(),
            key_management_type: key_management,
        };
        match self.ctx.client.create_wallet(session, &request).await {
            Ok(wallet) => {
                tracing::info!(wallet_id = %wallet.wallet_id, "wallet created");
                self.ctx.toaster.success("Wallet created successfully");
                if let Err(e) = self.load(session).await {
                    tracing::debug!(error = %e, "reload after create failed");
                }
                Ok(wallet)
            }
            Err(e) => {
                self.ctx.toaster.failed(&e, "Failed to create wallet");
                Err(e)
            }
        }
    }

    /// Request a test-network airdrop, then re-fetch until the balance moves.
    pub async fn fund(
        &mut self,
        session: &Session,
        wallet_id: &str,
    ) -> Result<FundOutcome, ClientError> {
        let before = self.find(wallet_id).map(Wallet::native_balance);
        self.ctx.toaster.info("Requesting airdrop from Solana devnet...");

        let result = match self.ctx.client.fund_wallet(session, wallet_id).await {
            Ok(result) => result,
            Err(e) => {
                self.ctx.toaster.failed(&e, "Failed to request airdrop");
                return Err(e);
            }
        };
        if !result.success {
            let err = ClientError::Rejected(
                result.error.clone().unwrap_or_else(|| "Airdrop failed".to_string()),
            );
            self.ctx.toaster.failed(&err, "Airdrop failed");
            return Err(err);
        }
        tracing::info!(
            wallet_id,
            signature = result.signature.as_deref().unwrap_or(""),
            "airdrop accepted"
        );
        self.ctx.toaster.success("Airdrop successful! 1 SOL added");

        let policy = self.ctx.config.settle;
        let client = self.ctx.client.clone();
        let outcome = poll_until_settled(
            &policy,
            || client.list_wallets(session),
            |wallets: &Vec<Wallet>| balance_changed(wallets, wallet_id, before),
        )
        .await;

        match (outcome.value, outcome.last_error) {
            (Some(wallets), _) => {
                let ticket = self.wallets.begin();
                self.wallets.apply(ticket, wallets);
            }
            (None, Some(err)) => {
                tracing::warn!(wallet_id, error = %err, "balance refresh after airdrop failed");
                self.ctx.toaster.failed(&err, "Failed to refresh wallet balance");
            }
            (None, None) => {}
        }
        Ok(FundOutcome {
            result,
            settled: outcome.settled,
            attempts: outcome.attempts,
        })
    }

    /// The wallet's public key, for the caller to place on the clipboard.
    pub fn copy_public_key(&self, wallet_id: &str) -> Result<String, ClientError> {
        let wallet = self
            .find(wallet_id)
            .ok_or_else(|| ClientError::Validation("Wallet not found".to_string()))?;
        self.ctx.toaster.success("Copied to clipboard");
        Ok(wallet.pubkey.clone())
    }
}

fn balance_changed(wallets: &[Wallet], wallet_id: &str, before: Option<Decimal>) -> bool {
    match wallets.iter().find(|w| w.wallet_id == wallet_id) {
        Some(w) => before.is_none_or(|b| w.balance(NATIVE_SYMBOL) != b),
        None => false,
    }
}
