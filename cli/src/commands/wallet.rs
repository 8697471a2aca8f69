use agentic_core::wallet::{KeyManagement, NATIVE_SYMBOL, format_amount};
use agentic_dashboard::{ClientError, Route, Shell};
use clap::Subcommand;
use serde_json::json;

use crate::util::emit;

#[derive(Subcommand)]
pub enum WalletCommands {
    /// List wallets with their balances
    List,
    /// Create a custodial wallet
    Create {
        /// Display name
        #[arg(long)]
        name: String,
        /// How the server keeps the private key (encrypted | ephemeral)
        #[arg(long, default_value = "encrypted")]
        key_management: KeyManagement,
    },
    /// Request a devnet airdrop and wait for the balance to update
    Fund {
        /// Wallet id
        wallet_id: String,
    },
    /// Reload balances
    Refresh,
    /// Print a wallet's public key
    Pubkey {
        /// Wallet id
        wallet_id: String,
    },
}

pub async fn run(shell: &mut Shell, command: WalletCommands) -> i32 {
    let session = shell.session();
    match command {
        WalletCommands::List => {
            let result = shell.navigate(Route::Wallets).await.map(|_| {
                shell
                    .wallets()
                    .wallets()
                    .iter()
                    .map(|w| {
                        json!({
                            "wallet_id": w.wallet_id,
                            "name": w.name,
                            "pubkey": w.pubkey,
                            "key_management_type": w.key_management_type,
                            "balance": format_amount(w.native_balance(), NATIVE_SYMBOL),
                            "created_at": w.created_at,
                        })
                    })
                    .collect::<Vec<_>>()
            });
            emit(shell, result)
        }
        WalletCommands::Create {
            name,
            key_management,
        } => {
            let result = async {
                shell.navigate(Route::Wallets).await?;
                shell.wallets().create(&session, &name, key_management).await
            }
            .await;
            emit(shell, result)
        }
        WalletCommands::Fund { wallet_id } => {
            let result = async {
                shell.navigate(Route::Wallets).await?;
                let outcome = shell.wallets().fund(&session, &wallet_id).await?;
                let balance = shell
                    .wallets()
                    .find(&wallet_id)
                    .map(|w| format_amount(w.native_balance(), NATIVE_SYMBOL));
                Ok::<_, ClientError>(json!({"fund": outcome, "balance": balance}))
            }
            .await;
            emit(shell, result)
        }
        WalletCommands::Refresh => {
            let result = async {
                shell.navigate(Route::Wallets).await?;
                shell.wallets().refresh(&session).await?;
                Ok::<_, ClientError>(shell.wallets().wallets().to_vec())
            }
            .await;
            emit(shell, result)
        }
        WalletCommands::Pubkey { wallet_id } => {
            let result = async {
                shell.navigate(Route::Wallets).await?;
                shell.wallets().copy_public_key(&wallet_id)
            }
            .await;
            emit(shell, result)
        }
    }
}
