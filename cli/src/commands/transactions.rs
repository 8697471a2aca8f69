use agentic_core::audit::{AuditLogEntry, OutcomeFilter};
use agentic_dashboard::views::TransactionsView;
use agentic_dashboard::{Route, Shell};
use clap::Subcommand;
use serde_json::{Value, json};

use crate::util::{emit, emit_line};

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// Show the latest audit log page
    List {
        /// all | success | failed
        #[arg(long, default_value = "all")]
        filter: OutcomeFilter,
    },
    /// Follow the audit log, printing one JSON line per new page (Ctrl-C to stop)
    Watch {
        #[arg(long, default_value = "all")]
        filter: OutcomeFilter,
    },
}

fn entry_json(entry: &AuditLogEntry) -> Value {
    json!({
        "timestamp": entry.timestamp,
        "action_type": entry.action_type,
        "wallet_id": entry.wallet_id,
        "amount": entry.amount(),
        "success": entry.success,
        "signature": entry.signature(),
        "explorer_url": entry.explorer_url(),
    })
}

fn page(view: &TransactionsView) -> Value {
    let entries: Vec<Value> = view.visible().iter().map(entry_json).collect();
    json!({
        "filter": view.filter(),
        "stats": view.stats(),
        "entries": entries,
    })
}

pub async fn run(shell: &mut Shell, command: TransactionsCommands) -> i32 {
    match command {
        TransactionsCommands::List { filter } => {
            let result = shell.navigate(Route::Transactions).await.map(|_| {
                let view = shell.transactions();
                view.set_filter(filter);
                page(view)
            });
            shell.close();
            emit(shell, result)
        }
        TransactionsCommands::Watch { filter } => {
            if let Err(e) = shell.navigate(Route::Transactions).await {
                tracing::warn!(error = %e, "initial audit log fetch failed, still watching");
            }
            let poll_interval = shell.context().config.audit_poll_interval;
            let view = shell.transactions();
            view.set_filter(filter);

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);
            let mut seen = None;
            loop {
                let revision = view.revision();
                if seen != Some(revision) && !view.is_loading() {
                    seen = Some(revision);
                    emit_line(&page(view));
                }
                tokio::select! {
                    _ = &mut ctrl_c => break,
                    _ = tokio::time::sleep(poll_interval / 5) => {}
                }
            }
            shell.close();
            tracing::info!("stopped watching");
            emit(shell, Ok(json!({"watching": false})))
        }
    }
}
