use std::fmt;
use std::str::FromStr;

use crate::Context;
use crate::error::ClientError;
use crate::session::{Session, SessionStore};
use crate::views::{
    AgentsView, AuthView, OverviewView, SecurityView, SwapView, TransactionsView, WalletsView,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Dashboard,
    Wallets,
    Agents,
    Swap,
    Transactions,
    Security,
    Auth,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Dashboard,
        Route::Wallets,
        Route::Agents,
        Route::Swap,
        Route::Transactions,
        Route::Security,
        Route::Auth,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Wallets => "/wallets",
            Route::Agents => "/agents",
            Route::Swap => "/swap",
            Route::Transactions => "/transactions",
            Route::Security => "/security",
            Route::Auth => "/auth",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Wallets => "Wallets",
            Route::Agents => "Agents",
            Route::Swap => "Swap",
            Route::Transactions => "Transactions",
            Route::Security => "Security",
            Route::Auth => "Account",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        Route::ALL
            .into_iter()
            .find(|r| r.path() == path || r.path().trim_start_matches('/') == path)
            .ok_or_else(|| format!("unknown route '{s}'"))
    }
}

/// Views of the active route. At most one field is populated at a time.
#[derive(Default)]
struct Views {
    overview: Option<OverviewView>,
    wallets: Option<WalletsView>,
    agents: Option<AgentsView>,
    swap: Option<SwapView>,
    transactions: Option<TransactionsView>,
    security: Option<SecurityView>,
    auth: Option<AuthView>,
}

/// Route selection. Navigating tears down the active view before the next one mounts.
pub struct Shell {
    ctx: Context,
    sessions: SessionStore,
    route: Route,
    views: Views,
}

macro_rules! view_accessor {
    ($name:ident, $route:ident, $ty:ty) => {
        /// The view for this route. Switching to it from another route unmounts that
        /// one first; the new view starts empty until mounted.
        pub fn $name(&mut self) -> &mut $ty {
            if self.route != Route::$route {
                self.leave();
                self.route = Route::$route;
            }
            let ctx = &self.ctx;
            self.views.$name.get_or_insert_with(|| <$ty>::new(ctx.clone()))
        }
    };
}

impl Shell {
    pub fn new(mut ctx: Context, sessions: SessionStore) -> Self {
        ctx.session = sessions.handle();
        Self {
            ctx,
            sessions,
            route: Route::default(),
            views: Views::default(),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn session(&self) -> Session {
        self.sessions.session()
    }

    pub fn sessions(&mut self) -> &mut SessionStore {
        &mut self.sessions
    }

    fn leave(&mut self) {
        if let Some(view) = self.views.transactions.as_mut() {
            view.unmount();
        }
        self.views = Views::default();
        tracing::debug!(route = %self.route, "view unmounted");
    }

    /// Unmount the current view, then mount and load the one for `route`.
    pub async fn navigate(&mut self, route: Route) -> Result<(), ClientError> {
        self.leave();
        self.route = route;
        tracing::debug!(%route, "navigating");
        let session = self.session();
        match route {
            Route::Dashboard => self.overview().mount(&session).await,
            Route::Wallets => self.wallets().mount(&session).await,
            Route::Agents => self.agents().mount(&session).await,
            Route::Swap => self.swap().mount(&session).await,
            Route::Transactions => self.transactions().mount(&session).await,
            Route::Security => self.security().mount(&session).await,
            Route::Auth => {
                let (view, sessions) = self.auth();
                if sessions.is_authenticated() {
                    view.load_api_keys(sessions).await
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Unmount whatever is active.
    pub fn close(&mut self) {
        self.leave();
    }

    view_accessor!(overview, Dashboard, OverviewView);
    view_accessor!(wallets, Wallets, WalletsView);
    view_accessor!(agents, Agents, AgentsView);
    view_accessor!(swap, Swap, SwapView);
    view_accessor!(transactions, Transactions, TransactionsView);
    view_accessor!(security, Security, SecurityView);

    /// The account view together with the session store it acts on.
    pub fn auth(&mut self) -> (&mut AuthView, &mut SessionStore) {
        if self.route != Route::Auth {
            self.leave();
            self.route = Route::Auth;
        }
        let ctx = &self.ctx;
        let view = self.views.auth.get_or_insert_with(|| AuthView::new(ctx.clone()));
        (view, &mut self.sessions)
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.leave();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;
    use crate::testing::{ScriptedTransport, audit_json, context, wallet_json};
    use serde_json::json;
    use std::time::Duration;

    fn shell(transport: &std::sync::Arc<ScriptedTransport>) -> Shell {
        Shell::new(
            context(transport),
            SessionStore::init(Box::new(MemoryTokenStore::new()), None),
        )
    }

    #[test]
    fn routes_parse_from_paths_and_names() {
        for route in Route::ALL {
            assert_eq!(route.path().parse::<Route>().unwrap(), route);
        }
        assert_eq!("transactions".parse::<Route>().unwrap(), Route::Transactions);
        assert_eq!("/swap/".parse::<Route>().unwrap(), Route::Swap);
        assert!("/settings".parse::<Route>().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn navigating_away_stops_the_transactions_poll() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", "audit/logs", 200, json!([audit_json("airdrop", true, 1)]));
        transport.reply("GET", "wallets", 200, json!([wallet_json("w1", "Treasury", 1.0)]));
        let mut shell = shell(&transport);

        shell.navigate(Route::Transactions).await.unwrap();
        assert!(shell.transactions().is_polling());
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(transport.count("GET", "audit/logs"), 2);

        shell.navigate(Route::Wallets).await.unwrap();
        assert_eq!(shell.route(), Route::Wallets);
        assert_eq!(shell.wallets().wallets().len(), 1);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(transport.count("GET", "audit/logs"), 2);
    }

    #[tokio::test]
    async fn auth_route_skips_key_listing_when_anonymous() {
        let transport = ScriptedTransport::new();
        let mut shell = shell(&transport);
        shell.navigate(Route::Auth).await.unwrap();
        assert_eq!(transport.request_count(), 0);
        let (view, sessions) = shell.auth();
        assert!(view.keys().is_loading());
        assert!(!sessions.is_authenticated());
    }

    #[tokio::test]
    async fn accessor_reuses_the_mounted_view() {
        let transport = ScriptedTransport::new();
        transport.reply("GET", "wallets", 200, json!([wallet_json("w1", "Treasury", 1.0)]));
        let mut shell = shell(&transport);
        shell.navigate(Route::Wallets).await.unwrap();
        assert_eq!(shell.wallets().wallets().len(), 1);
        assert_eq!(transport.count("GET", "wallets"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transactions_poll_follows_a_later_login() {
        use crate::testing::jwt_expiring_at;
        use chrono::Utc;

        let transport = ScriptedTransport::new();
        let token = jwt_expiring_at(Utc::now() + chrono::Duration::hours(24));
        transport.reply("GET", "audit/logs", 200, json!([audit_json("airdrop", true, 1)]));
        transport.reply(
            "POST",
            "auth/login",
            200,
            json!({"user_id": "u1", "username": "ada", "token": token}),
        );
        let mut shell = shell(&transport);

        shell.navigate(Route::Transactions).await.unwrap();
        let client = shell.context().client.clone();
        shell.sessions().login(&client, "ada", "pw").await.unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;

        let bearers: Vec<Option<String>> = transport
            .requests()
            .into_iter()
            .filter(|r| r.url.path() == "/api/audit/logs")
            .map(|r| r.bearer)
            .collect();
        assert_eq!(bearers, vec![None, Some(token)]);
        shell.close();
    }
}
