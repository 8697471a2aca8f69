use agentic_dashboard::views::SwapView;
use agentic_dashboard::{ClientError, Route, Shell, Session};
use clap::{Args, Subcommand};
use serde_json::{Value, json};

use crate::util::emit;

#[derive(Subcommand)]
pub enum SwapCommands {
    /// List supported tokens (symbol -> mint)
    Tokens,
    /// Fetch an advisory quote
    Quote(PairArgs),
    /// Quote and execute a swap from a wallet
    Execute {
        #[command(flatten)]
        pair: PairArgs,
        /// Wallet to swap from (defaults to the first wallet)
        #[arg(long)]
        wallet_id: Option<String>,
    },
}

#[derive(Args)]
pub struct PairArgs {
    /// Input token symbol or mint (defaults to SOL)
    #[arg(long)]
    from: Option<String>,
    /// Output token symbol or mint (defaults to USDC)
    #[arg(long)]
    to: Option<String>,
    /// Amount of the input token
    #[arg(long)]
    amount: String,
}

fn select(view: &mut SwapView, pair: &PairArgs) -> Result<(), ClientError> {
    for (raw, input) in [(&pair.from, true), (&pair.to, false)] {
        let Some(raw) = raw else { continue };
        let mint = view
            .resolve_token(raw)
            .ok_or_else(|| ClientError::Validation(format!("Unsupported token '{raw}'")))?;
        if input {
            view.set_input_token(mint);
        } else {
            view.set_output_token(mint);
        }
    }
    view.set_amount(pair.amount.clone());
    Ok(())
}

fn describe(view: &SwapView) -> Value {
    let Some(held) = view.quote() else {
        return Value::Null;
    };
    let symbol = |mint: &str| view.symbol(mint).unwrap_or(mint).to_string();
    json!({
        "from": symbol(&held.key.input_mint),
        "to": symbol(&held.key.output_mint),
        "amount_in": held.quote.amount_in,
        "amount_out": held.quote.amount_out,
        "rate": held.quote.rate(),
        "price_impact": held.quote.price_impact,
        "high_impact": held.quote.is_high_impact(),
    })
}

async fn quote(
    shell: &mut Shell,
    session: &Session,
    pair: &PairArgs,
) -> Result<Value, ClientError> {
    shell.navigate(Route::Swap).await?;
    let view = shell.swap();
    select(view, pair)?;
    view.request_quote(session).await?;
    Ok(describe(view))
}

pub async fn run(shell: &mut Shell, command: SwapCommands) -> i32 {
    let session = shell.session();
    match command {
        SwapCommands::Tokens => {
            let result = shell
                .navigate(Route::Swap)
                .await
                .map(|_| shell.swap().tokens().cloned().unwrap_or_default());
            emit(shell, result)
        }
        SwapCommands::Quote(pair) => {
            let result = quote(shell, &session, &pair).await;
            emit(shell, result)
        }
        SwapCommands::Execute { pair, wallet_id } => {
            let result = async {
                if let Some(wallet_id) = &wallet_id {
                    shell.navigate(Route::Swap).await?;
                    shell.swap().set_wallet(wallet_id.clone());
                    let view = shell.swap();
                    select(view, &pair)?;
                    view.request_quote(&session).await?;
                } else {
                    quote(shell, &session, &pair).await?;
                }
                let view = shell.swap();
                let quoted = describe(view);
                let wallet = view.wallet_id().map(str::to_owned);
                let swap = view.execute(&session).await?;
                Ok::<_, ClientError>(json!({"wallet_id": wallet, "quote": quoted, "swap": swap}))
            }
            .await;
            emit(shell, result)
        }
    }
}
