//! Client-side view/data-synchronization layer for the agentic wallet backend.
//!
//! Every view is a thin model over one or more REST resources: it fetches on mount,
//! exposes a loading or ready snapshot, and reloads the whole collection after each
//! user action. Failures become toasts and never clear what is already on screen.

use std::sync::Arc;

pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod session;
pub mod settle;
pub mod shell;
pub mod state;
pub mod toast;
pub mod transport;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ApiClient;
pub use config::DashboardConfig;
pub use error::ClientError;
pub use session::{Session, SessionHandle, SessionStore};
pub use shell::{Route, Shell};
pub use toast::{Level, Toast, Toaster};

/// Collaborators every view needs: the API client, the toast sink and the tunables.
///
/// Foreground calls take the session as an argument. `session` is only read by
/// background work such as the audit poll, so it sees logins made after it started.
#[derive(Clone)]
pub struct Context {
    pub client: ApiClient,
    pub toaster: Toaster,
    pub config: Arc<DashboardConfig>,
    pub session: SessionHandle,
}

impl Context {
    pub fn new(client: ApiClient, config: DashboardConfig) -> Self {
        Self {
            client,
            toaster: Toaster::default(),
            config: Arc::new(config),
            session: SessionHandle::default(),
        }
    }

    /// Context talking HTTP to `config.backend_url`.
    pub fn over_http(config: DashboardConfig) -> Self {
        let client = ApiClient::over_http(&config.backend_url);
        Self::new(client, config)
    }
}
