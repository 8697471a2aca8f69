use agentic_dashboard::session::FileTokenStore;
use agentic_dashboard::{ClientError, Context, DashboardConfig, SessionStore, Shell, Toast};
use serde::Serialize;
use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "agentic_dashboard=info,agentic_cli=info";

/// Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Shell over HTTP with the session persisted in the user's config directory.
pub fn open_shell(backend_url: &str, api_key: Option<String>) -> Shell {
    let config = DashboardConfig {
        backend_url: backend_url.to_string(),
        ..DashboardConfig::from_env()
    };
    let sessions = SessionStore::init(Box::new(FileTokenStore::default()), api_key);
    Shell::new(Context::over_http(config), sessions)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", pretty(&err));
    std::process::exit(4);
}

/// Exit codes: 0=success, 1=client error, 2=server error, 3=connection error, 4=usage error
pub fn exit_code(err: &ClientError) -> i32 {
    match err {
        ClientError::Status { status, .. } if *status >= 500 => 2,
        ClientError::Decode(_) => 2,
        ClientError::Connection(_) => 3,
        ClientError::Config(_) => 4,
        _ => 1,
    }
}

fn docs_hint(err: &ClientError) -> Option<&'static str> {
    match err {
        ClientError::Unauthenticated | ClientError::SessionExpired { .. } => {
            Some("Run `agentic login` or set AGENTIC_API_KEY.")
        }
        ClientError::Connection(_) => {
            Some("Is the backend running? Check AGENTIC_BACKEND_URL.")
        }
        ClientError::StaleQuote => Some("Request a new quote with `agentic swap quote`."),
        ClientError::Persistence(_) => Some("Check permissions on the agentic config directory."),
        _ => None,
    }
}

/// Print the outcome of one action together with the notifications it raised,
/// and return the process exit code.
pub fn emit<T: Serialize>(shell: &Shell, result: Result<T, ClientError>) -> i32 {
    let notifications: Vec<Toast> = shell.context().toaster.drain();
    match result.map(|v| serde_json::to_value(v)) {
        Ok(Ok(value)) => {
            println!(
                "{}",
                pretty(&json!({
                    "result": value,
                    "notifications": notifications
                }))
            );
            0
        }
        Ok(Err(e)) => {
            eprintln!(
                "{}",
                pretty(&json!({
                    "error": "cli_error",
                    "message": format!("could not render result: {e}")
                }))
            );
            1
        }
        Err(err) => {
            let mut body = json!({
                "error": err.code(),
                "message": err.to_string(),
                "notifications": notifications
            });
            if let Some(hint) = docs_hint(&err) {
                body["docs_hint"] = json!(hint);
            }
            eprintln!("{}", pretty(&body));
            exit_code(&err)
        }
    }
}

/// One line of JSON, for streaming output.
pub fn emit_line(value: &Value) {
    println!("{value}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_status_class() {
        let client = ClientError::Status {
            status: 404,
            detail: None,
        };
        let server = ClientError::Status {
            status: 503,
            detail: None,
        };
        assert_eq!(exit_code(&client), 1);
        assert_eq!(exit_code(&server), 2);
        assert_eq!(exit_code(&ClientError::Connection("refused".into())), 3);
        assert_eq!(exit_code(&ClientError::Config("bad url".into())), 4);
        assert_eq!(exit_code(&ClientError::Validation("x".into())), 1);
    }

    #[test]
    fn auth_failures_point_at_login() {
        assert!(docs_hint(&ClientError::Unauthenticated)
            .unwrap()
            .contains("agentic login"));
        assert!(docs_hint(&ClientError::Decode("x".into())).is_none());
    }
}
