use agentic_core::swap::{ExecuteSwapRequest, QuoteRequest, SwapQuote, SwapResult, TokenList};
use agentic_core::wallet::Wallet;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::Context;
use crate::error::ClientError;
use crate::session::Session;
use crate::state::Synced;

use super::parse_positive_amount;

/// The selection a quote was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteKey {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: Decimal,
}

/// A quote together with the selection it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeldQuote {
    pub key: QuoteKey,
    pub quote: SwapQuote,
}

pub struct SwapView {
    ctx: Context,
    tokens: Synced<TokenList>,
    wallets: Synced<Vec<Wallet>>,
    input_mint: Option<String>,
    output_mint: Option<String>,
    amount: String,
    wallet_id: Option<String>,
    quote: Option<HeldQuote>,
}

impl SwapView {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            tokens: Synced::new(),
            wallets: Synced::new(),
            input_mint: None,
            output_mint: None,
            amount: String::new(),
            wallet_id: None,
            quote: None,
        }
    }

    /// Load tokens and wallets concurrently and pick the default pair and wallet.
    pub async fn mount(&mut self, session: &Session) -> Result<(), ClientError> {
        let (token_ticket, wallet_ticket) = (self.tokens.begin(), self.wallets.begin());
        let client = &self.ctx.client;
        let (tokens, wallets) =
            tokio::join!(client.swap_tokens(session), client.list_wallets(session));

        let mut failure = None;
        match tokens {
            Ok(tokens) => {
                if self.input_mint.is_none() && self.output_mint.is_none() {
                    if let (Some(sol), Some(usdc)) = (tokens.get("SOL"), tokens.get("USDC")) {
                        self.input_mint = Some(sol.clone());
                        self.output_mint = Some(usdc.clone());
                    }
                }
                self.tokens.apply(token_ticket, tokens);
            }
            Err(e) => {
                self.tokens.fail(token_ticket);
                failure = Some(e);
            }
        }
        match wallets {
            Ok(wallets) => {
                if self.wallet_id.is_none() {
                    self.wallet_id = wallets.first().map(|w| w.wallet_id.clone());
                }
                self.wallets.apply(wallet_ticket, wallets);
            }
            Err(e) => {
                self.wallets.fail(wallet_ticket);
                failure.get_or_insert(e);
            }
        }
        match failure {
            Some(e) => {
                self.ctx.toaster.failed(&e, "Failed to load swap data");
                Err(e)
            }
            None => Ok(()),
        }
    }

    pub fn tokens(&self) -> Option<&TokenList> {
        self.tokens.get()
    }

    pub fn wallets(&self) -> &[Wallet] {
        self.wallets.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mint for a symbol, or the input itself when it is already a listed mint.
    pub fn resolve_token(&self, symbol_or_mint: &str) -> Option<String> {
        let tokens = self.tokens.get()?;
        let wanted = symbol_or_mint.trim();
        tokens
            .iter()
            .find(|(symbol, mint)| symbol.eq_ignore_ascii_case(wanted) || mint.as_str() == wanted)
            .map(|(_, mint)| mint.clone())
    }

    /// Symbol for a mint, for display.
    pub fn symbol(&self, mint: &str) -> Option<&str> {
        self.tokens
            .get()?
            .iter()
            .find(|(_, m)| m.as_str() == mint)
            .map(|(s, _)| s.as_str())
    }

    pub fn input_mint(&self) -> Option<&str> {
        self.input_mint.as_deref()
    }

    pub fn output_mint(&self) -> Option<&str> {
        self.output_mint.as_deref()
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn wallet_id(&self) -> Option<&str> {
        self.wallet_id.as_deref()
    }

    pub fn quote(&self) -> Option<&HeldQuote> {
        self.quote.as_ref()
    }

    fn invalidate(&mut self) {
        if self.quote.take().is_some() {
            tracing::debug!("swap selection changed, quote discarded");
        }
    }

    pub fn set_input_token(&mut self, mint: impl Into<String>) {
        self.input_mint = Some(mint.into());
        self.invalidate();
    }

    pub fn set_output_token(&mut self, mint: impl Into<String>) {
        self.output_mint = Some(mint.into());
        self.invalidate();
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.amount = amount.into();
        self.invalidate();
    }

    pub fn set_wallet(&mut self, wallet_id: impl Into<String>) {
        self.wallet_id = Some(wallet_id.into());
        self.invalidate();
    }

    /// Exchange input and output tokens.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.input_mint, &mut self.output_mint);
        self.invalidate();
    }

    fn current_key(&self) -> Result<QuoteKey, ClientError> {
        let missing = || ClientError::Validation("Please fill all fields".to_string());
        let input_mint = self.input_mint.clone().filter(|m| !m.is_empty()).ok_or_else(missing)?;
        let output_mint = self.output_mint.clone().filter(|m| !m.is_empty()).ok_or_else(missing)?;
        if self.amount.trim().is_empty() {
            return Err(missing());
        }
        let amount = parse_positive_amount(&self.amount, "an amount")?;
        if input_mint == output_mint {
            return Err(ClientError::Validation(
                "Input and output tokens must differ".to_string(),
            ));
        }
        Ok(QuoteKey {
            input_mint,
            output_mint,
            amount,
        })
    }

    pub async fn request_quote(&mut self, session: &Session) -> Result<SwapQuote, ClientError> {
        self.invalidate();
        let key = match self.current_key() {
            Ok(key) => key,
            Err(e) => {
                self.ctx.toaster.failed(&e, "");
                return Err(e);
            }
        };
        let request = QuoteRequest {
            input_mint: key.input_mint.clone(),
            output_mint: key.output_mint.clone(),
            amount: key.amount,
            token_decimals: self.ctx.config.token_decimals,
        };
        let resp = match self.ctx.client.swap_quote(session, &request).await {
            Ok(resp) => resp,
            Err(e) => {
                self.ctx.toaster.failed(&e, "Failed to fetch quote");
                return Err(e);
            }
        };
        match SwapQuote::from_response(&request, resp) {
            Ok(quote) => {
                tracing::info!(
                    amount_in = %quote.amount_in,
                    amount_out = %quote.amount_out,
                    "quote fetched"
                );
                self.ctx.toaster.success("Quote fetched successfully");
                self.quote = Some(HeldQuote {
                    key,
                    quote: quote.clone(),
                });
                Ok(quote)
            }
            Err(reason) => {
                tracing::warn!(%reason, "quote rejected");
                self.ctx.toaster.error("Failed to get quote");
                Err(ClientError::Rejected(reason))
            }
        }
    }

    /// Execute against the held quote. A quote for a different selection is refused.
    pub async fn execute(&mut self, session: &Session) -> Result<SwapResult, ClientError> {
        let request = match self.execute_request() {
            Ok(request) => request,
            Err(e) => {
                if matches!(e, ClientError::StaleQuote) {
                    self.quote = None;
                }
                self.ctx.toaster.failed(&e, "");
                return Err(e);
            }
        };

        self.ctx.toaster.info("Executing swap...");
        let result = match self.ctx.client.swap_execute(session, &request).await {
            Ok(result) => result,
            Err(e) => {
                self.ctx.toaster.failed(&e, "Failed to execute swap");
                return Err(e);
            }
        };
        if !result.success {
            let err = ClientError::Rejected(
                result.error.clone().unwrap_or_else(|| "Swap failed".to_string()),
            );
            self.ctx.toaster.failed(&err, "Swap failed");
            return Err(err);
        }
        tracing::info!(wallet_id = %request.wallet_id, "swap executed");
        self.ctx.toaster.success("Swap executed successfully!");
        self.quote = None;
        self.amount.clear();
        Ok(result)
    }

    fn execute_request(&self) -> Result<ExecuteSwapRequest, ClientError> {
        let (Some(held), Some(wallet_id)) = (&self.quote, &self.wallet_id) else {
            return Err(ClientError::Validation(
                "Please get a quote first and select a wallet".to_string(),
            ));
        };
        match self.current_key() {
            Ok(key) if key == held.key => Ok(ExecuteSwapRequest {
                wallet_id: wallet_id.clone(),
                input_mint: key.input_mint,
                output_mint: key.output_mint,
                amount: key.amount,
                slippage_bps: self.ctx.config.slippage_bps,
            }),
            _ => Err(ClientError::StaleQuote),
        }
    }
}
