mod commands;
mod util;

use agentic_dashboard::config::DEFAULT_BACKEND_URL;
use clap::{Parser, Subcommand};

use commands::agent::AgentCommands;
use commands::auth::ApiKeyCommands;
use commands::policy::PolicyCommands;
use commands::swap::SwapCommands;
use commands::transactions::TransactionsCommands;
use commands::wallet::WalletCommands;
use util::{exit_error, init_tracing, open_shell};

#[derive(Parser)]
#[command(
    name = "agentic",
    version,
    about = "Agentic wallet dashboard: wallets, agents, swaps and the audit log from the terminal"
)]
struct Cli {
    /// Backend base URL (resources live under <url>/api)
    #[arg(long, env = "AGENTIC_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// API key to use instead of the stored login
    #[arg(long, env = "AGENTIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Emit logs as JSON (stderr)
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overview: totals and recent activity
    Dashboard,
    /// List the dashboard screens
    Routes,
    /// Wallet operations
    Wallet {
        #[command(subcommand)]
        command: WalletCommands,
    },
    /// Agent operations
    Agent {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Token swaps
    Swap {
        #[command(subcommand)]
        command: SwapCommands,
    },
    /// Audit log
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Per-wallet spending policy
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
    /// Log in and store the session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "AGENTIC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and store the session
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "AGENTIC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Remove the stored session
    Logout,
    /// Show which credentials would be used (no request)
    Status,
    /// API key management (requires login)
    ApiKey {
        #[command(subcommand)]
        command: ApiKeyCommands,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if cli.backend_url.trim().is_empty() {
        exit_error(
            "backend URL is empty",
            Some("Set --backend-url or AGENTIC_BACKEND_URL"),
        );
    }

    let code = {
        let mut shell = open_shell(&cli.backend_url, cli.api_key);
        match cli.command {
            Commands::Dashboard => commands::dashboard::run(&mut shell).await,
            Commands::Routes => commands::dashboard::routes(),
            Commands::Wallet { command } => commands::wallet::run(&mut shell, command).await,
            Commands::Agent { command } => commands::agent::run(&mut shell, command).await,
            Commands::Swap { command } => commands::swap::run(&mut shell, command).await,
            Commands::Transactions { command } => {
                commands::transactions::run(&mut shell, command).await
            }
            Commands::Policy { command } => commands::policy::run(&mut shell, command).await,
            Commands::Login { username, password } => {
                commands::auth::login(&mut shell, &username, &password).await
            }
            Commands::Register {
                username,
                email,
                password,
            } => commands::auth::register(&mut shell, &username, &email, &password).await,
            Commands::Logout => commands::auth::logout(&mut shell),
            Commands::Status => commands::auth::status(&mut shell, &cli.backend_url),
            Commands::ApiKey { command } => commands::auth::api_key(&mut shell, command).await,
        }
    };

    std::process::exit(code);
}
