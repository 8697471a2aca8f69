use agentic_core::agent::AgentType;
use agentic_dashboard::{ClientError, Route, Shell};
use clap::Subcommand;
use rust_decimal::Decimal;
use serde_json::json;

use crate::util::emit;

#[derive(Subcommand)]
pub enum AgentCommands {
    /// List agents with the wallet each one controls
    List,
    /// Create an agent bound to a wallet
    Create {
        #[arg(long)]
        name: String,
        /// Decision engine (rule-based | llm-driven)
        #[arg(long, default_value = "rule-based")]
        agent_type: AgentType,
        #[arg(long)]
        wallet_id: String,
    },
    /// Ask an agent to judge a transfer to another wallet (simulation only)
    Test {
        /// Agent id
        agent_id: String,
        /// Transfer amount in SOL (defaults to the configured test amount)
        #[arg(long)]
        amount: Option<Decimal>,
    },
}

pub async fn run(shell: &mut Shell, command: AgentCommands) -> i32 {
    let session = shell.session();
    match command {
        AgentCommands::List => {
            let result = shell.navigate(Route::Agents).await.map(|_| {
                let view = shell.agents();
                view.agents()
                    .iter()
                    .map(|a| {
                        json!({
                            "agent_id": a.agent_id,
                            "name": a.name,
                            "agent_type": a.agent_type,
                            "wallet": view.wallet_label(a),
                            "wallet_id": a.wallet_id,
                            "policy": a.policy,
                            "status": a.status,
                            "created_at": a.created_at,
                        })
                    })
                    .collect::<Vec<_>>()
            });
            emit(shell, result)
        }
        AgentCommands::Create {
            name,
            agent_type,
            wallet_id,
        } => {
            let result = async {
                shell.navigate(Route::Agents).await?;
                shell
                    .agents()
                    .create(&session, &name, agent_type, &wallet_id)
                    .await
            }
            .await;
            emit(shell, result)
        }
        AgentCommands::Test { agent_id, amount } => {
            let amount = amount.unwrap_or(shell.context().config.agent_test_amount);
            let result = async {
                shell.navigate(Route::Agents).await?;
                let decision = shell.agents().execute(&session, &agent_id, amount).await?;
                Ok::<_, ClientError>(json!({
                    "agent_id": agent_id,
                    "amount": amount,
                    "decision": decision,
                }))
            }
            .await;
            emit(shell, result)
        }
    }
}
