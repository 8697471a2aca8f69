use agentic_core::auth::redact;
use agentic_dashboard::{ClientError, Shell};
use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::util::emit;

#[derive(Subcommand)]
pub enum ApiKeyCommands {
    /// List API keys of the logged-in account
    List,
    /// Create an API key. The secret is printed once.
    Create {
        /// Human-readable label
        #[arg(long)]
        name: String,
    },
}

pub async fn login(shell: &mut Shell, username: &str, password: &str) -> i32 {
    let (view, sessions) = shell.auth();
    let result = view.login(sessions, username, password).await.map(|resp| {
        json!({
            "status": "authenticated",
            "user_id": resp.user_id,
            "username": resp.username,
            "expires_at": sessions.stored().and_then(|c| c.expires_at),
        })
    });
    emit(shell, result)
}

pub async fn register(shell: &mut Shell, username: &str, email: &str, password: &str) -> i32 {
    let (view, sessions) = shell.auth();
    let result = view
        .register(sessions, username, email, password)
        .await
        .map(|resp| {
            json!({
                "status": "registered",
                "user_id": resp.user_id,
                "username": resp.username,
                "email": resp.email,
            })
        });
    emit(shell, result)
}

pub fn logout(shell: &mut Shell) -> i32 {
    let (view, sessions) = shell.auth();
    let result = view
        .logout(sessions)
        .map(|_| json!({"status": "logged_out"}));
    emit(shell, result)
}

/// Where the bearer comes from, without making a request.
pub fn status(shell: &mut Shell, backend_url: &str) -> i32 {
    let sessions = shell.sessions();
    let result = if sessions.uses_api_key() {
        let key = sessions.session();
        let prefix = key.bearer(Utc::now()).ok().flatten().map(redact);
        Ok(json!({
            "authenticated": true,
            "method": "api_key (env)",
            "key": prefix,
            "backend_url": backend_url,
        }))
    } else if let Some(creds) = sessions.stored() {
        Ok(json!({
            "authenticated": !creds.is_expired(Utc::now()),
            "method": "session (stored)",
            "username": creds.username,
            "expires_at": creds.expires_at,
            "backend_url": backend_url,
        }))
    } else {
        Err(ClientError::Unauthenticated)
    };
    emit(shell, result)
}

pub async fn api_key(shell: &mut Shell, command: ApiKeyCommands) -> i32 {
    let (view, sessions) = shell.auth();
    let result = match command {
        ApiKeyCommands::List => view
            .load_api_keys(sessions)
            .await
            .map(|_| json!(view.keys().ready())),
        ApiKeyCommands::Create { name } => {
            let created = view.create_api_key(sessions, &name).await;
            view.dismiss_created();
            created.map(|key| {
                json!({
                    "key_id": key.key_id,
                    "name": key.name,
                    "api_key": key.api_key,
                    "permissions": key.permissions,
                    "notice": "Store this key now; it will not be shown again.",
                })
            })
        }
    };
    emit(shell, result)
}
