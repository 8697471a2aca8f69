use agentic_dashboard::{ClientError, Route, Shell};
use clap::Subcommand;
use serde_json::json;

use crate::util::emit;

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Show a wallet's spending policy
    Show {
        /// Wallet id
        wallet_id: String,
    },
    /// Change a wallet's daily spend limit
    Set {
        /// Wallet id
        wallet_id: String,
        /// New limit in SOL
        #[arg(long)]
        max_daily_spend: String,
    },
}

pub async fn run(shell: &mut Shell, command: PolicyCommands) -> i32 {
    let session = shell.session();
    let result = async {
        shell.navigate(Route::Security).await?;
        let view = shell.security();
        let wallet_id = match &command {
            PolicyCommands::Show { wallet_id } => wallet_id,
            PolicyCommands::Set { wallet_id, .. } => wallet_id,
        };
        view.select_wallet(&session, wallet_id).await?;
        if let PolicyCommands::Set {
            max_daily_spend, ..
        } = &command
        {
            view.update_max_daily_spend(&session, max_daily_spend)
                .await?;
        }
        let policy = view.policy().ready().cloned().flatten();
        Ok::<_, ClientError>(json!({"wallet_id": wallet_id, "policy": policy}))
    }
    .await;
    emit(shell, result)
}
