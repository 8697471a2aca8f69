use agentic_core::auth::{ApiKey, AuthResponse, CreateApiKeyRequest, CreatedApiKey};

use crate::Context;
use crate::error::ClientError;
use crate::session::SessionStore;
use crate::state::{Loadable, Synced};
use crate::toast::failure;

/// Login, registration and API-key management.
pub struct AuthView {
    ctx: Context,
    keys: Synced<Vec<ApiKey>>,
    created: Option<CreatedApiKey>,
}

impl AuthView {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            keys: Synced::new(),
            created: None,
        }
    }

    fn auth_failed(&self, err: &ClientError, fallback: &str) {
        let message = err
            .detail()
            .map(str::to_owned)
            .unwrap_or_else(|| failure(err, fallback));
        self.ctx.toaster.error(message);
    }

    pub async fn login(
        &mut self,
        sessions: &mut SessionStore,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        match sessions.login(&self.ctx.client, username, password).await {
            Ok(resp) => {
                self.ctx.toaster.success("Login successful!");
                Ok(resp)
            }
            Err(e) => {
                self.auth_failed(&e, "Login failed");
                Err(e)
            }
        }
    }

    pub async fn register(
        &mut self,
        sessions: &mut SessionStore,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        match sessions
            .register(&self.ctx.client, username, email, password)
            .await
        {
            Ok(resp) => {
                self.ctx.toaster.success("Registration successful!");
                Ok(resp)
            }
            Err(e) => {
                self.auth_failed(&e, "Registration failed");
                Err(e)
            }
        }
    }

    /// Forget the login and everything fetched under it.
    pub fn logout(&mut self, sessions: &mut SessionStore) -> Result<(), ClientError> {
        self.keys = Synced::new();
        self.created = None;
        if let Err(e) = sessions.logout() {
            self.ctx.toaster.failed(&e, "Failed to clear stored session");
            return Err(e);
        }
        self.ctx.toaster.success("Logged out");
        Ok(())
    }

    pub async fn load_api_keys(&mut self, sessions: &mut SessionStore) -> Result<(), ClientError> {
        let ticket = self.keys.begin();
        match self.ctx.client.list_api_keys(&sessions.session()).await {
            Ok(keys) => {
                self.keys.apply(ticket, keys);
                Ok(())
            }
            Err(e) => {
                if matches!(e, ClientError::SessionExpired { .. }) {
                    sessions.expire();
                }
                self.keys.fail(ticket);
                self.ctx.toaster.failed(&e, "Failed to load API keys");
                Err(e)
            }
        }
    }

    /// Create a key. The returned secret is shown once and not kept beyond `last_created`.
    pub async fn create_api_key(
        &mut self,
        sessions: &mut SessionStore,
        name: &str,
    ) -> Result<CreatedApiKey, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            let err = ClientError::Validation("Please enter a key name".to_string());
            self.ctx.toaster.failed(&err, "");
            return Err(err);
        }
        let request = CreateApiKeyRequest {
            name: name.to_string(),
        };
        match self
            .ctx
            .client
            .create_api_key(&sessions.session(), &request)
            .await
        {
            Ok(created) => {
                tracing::info!(key_id = %created.key_id, "api key created");
                self.ctx.toaster.success("API key created!");
                self.created = Some(created.clone());
                let _ = self.load_api_keys(sessions).await;
                Ok(created)
            }
            Err(e) => {
                if matches!(e, ClientError::SessionExpired { .. }) {
                    sessions.expire();
                }
                self.ctx.toaster.failed(&e, "Failed to create API key");
                Err(e)
            }
        }
    }

    pub fn keys(&self) -> &Loadable<Vec<ApiKey>> {
        self.keys.state()
    }

    pub fn last_created(&self) -> Option<&CreatedApiKey> {
        self.created.as_ref()
    }

    /// Drop the one-time secret once it has been shown.
    pub fn dismiss_created(&mut self) {
        self.created = None;
    }
}
