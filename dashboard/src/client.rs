use std::sync::Arc;

use agentic_core::agent::{Agent, CreateAgentRequest, DecisionResponse, ExecuteActionRequest};
use agentic_core::audit::AuditLogEntry;
use agentic_core::auth::{
    ApiKey, AuthResponse, CreateApiKeyRequest, CreatedApiKey, LoginRequest, RegisterRequest,
};
use agentic_core::error::detail_message;
use agentic_core::policy::{Policy, PolicyUpdate};
use agentic_core::swap::{ExecuteSwapRequest, QuoteRequest, QuoteResponse, SwapResult, TokenList};
use agentic_core::wallet::{CreateWalletRequest, FundResult, Wallet};
use chrono::Utc;
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;
use crate::session::Session;
use crate::transport::{ApiRequest, HttpTransport, Transport};

/// Whether an endpoint needs an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Bearer attached when a live one is present
    Public,
    /// Fails locally without a live bearer
    Authenticated,
}

/// Typed access to the wallet-management API rooted at `<backend>/api`.
#[derive(Clone)]
pub struct ApiClient {
    api_root: String,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(backend_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_root: format!("{}/api", backend_url.trim().trim_end_matches('/')),
            transport,
        }
    }

    pub fn over_http(backend_url: &str) -> Self {
        Self::new(backend_url, Arc::new(HttpTransport::new()))
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ClientError> {
        let root = &self.api_root;
        let mut url = Url::parse(root)
            .map_err(|e| ClientError::Config(format!("invalid backend URL {root}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("backend URL {root} cannot carry a path")))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut q = url.query_pairs_mut();
            for (k, v) in query {
                q.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        session: &Session,
        access: Access,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let bearer = match session.bearer(Utc::now()) {
            Ok(token) => token.map(str::to_owned),
            Err(err) if access == Access::Public => {
                tracing::debug!(error = %err, "not attaching expired bearer to public request");
                None
            }
            Err(err) => return Err(err),
        };
        if access == Access::Authenticated && bearer.is_none() {
            return Err(ClientError::Unauthenticated);
        }

        let url = self.url(segments, query)?;
        let path = url.path().to_string();
        tracing::debug!(%method, %path, "api request");

        let resp = self
            .transport
            .send(ApiRequest {
                method: method.clone(),
                url,
                bearer,
                body,
            })
            .await
            .inspect_err(|e| tracing::warn!(%method, %path, error = %e, "api request failed"))?;

        if !resp.is_success() {
            let detail = detail_message(&resp.body);
            tracing::warn!(
                %method,
                %path,
                status = resp.status,
                detail = detail.as_deref().unwrap_or(""),
                "api request rejected"
            );
            return Err(ClientError::Status {
                status: resp.status,
                detail,
            });
        }

        serde_json::from_value(resp.body).map_err(|e| ClientError::Decode(format!("{path}: {e}")))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        session: &Session,
        access: Access,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        self.call(session, access, Method::GET, segments, query, None)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        session: &Session,
        access: Access,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ClientError::Decode(format!("request body: {e}")))?;
        self.call(session, access, Method::POST, segments, &[], body)
            .await
    }

    // --- auth ---

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.post(&Session::Anonymous, Access::Public, &["auth", "login"], Some(request))
            .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.post(
            &Session::Anonymous,
            Access::Public,
            &["auth", "register"],
            Some(request),
        )
        .await
    }

    pub async fn list_api_keys(&self, session: &Session) -> Result<Vec<ApiKey>, ClientError> {
        self.get(session, Access::Authenticated, &["auth", "api-keys"], &[])
            .await
    }

    pub async fn create_api_key(
        &self,
        session: &Session,
        request: &CreateApiKeyRequest,
    ) -> Result<CreatedApiKey, ClientError> {
        self.post(
            session,
            Access::Authenticated,
            &["auth", "api-keys"],
            Some(request),
        )
        .await
    }

    // --- wallets ---

    pub async fn list_wallets(&self, session: &Session) -> Result<Vec<Wallet>, ClientError> {
        self.get(session, Access::Public, &["wallets"], &[]).await
    }

    pub async fn create_wallet(
        &self,
        session: &Session,
        request: &CreateWalletRequest,
    ) -> Result<Wallet, ClientError> {
        self.post(session, Access::Public, &["wallets"], Some(request))
            .await
    }

    pub async fn fund_wallet(
        &self,
        session: &Session,
        wallet_id: &str,
    ) -> Result<FundResult, ClientError> {
        let path = ["wallets", wallet_id, "fund"];
        self.post::<FundResult, Value>(session, Access::Public, &path, None).await
    }

    // --- agents ---

    pub async fn list_agents(&self, session: &Session) -> Result<Vec<Agent>, ClientError> {
        self.get(session, Access::Public, &["agents"], &[]).await
    }

    pub async fn create_agent(
        &self,
        session: &Session,
        request: &CreateAgentRequest,
    ) -> Result<Agent, ClientError> {
        self.post(session, Access::Public, &["agents"], Some(request))
            .await
    }

    pub async fn execute_agent(
        &self,
        session: &Session,
        request: &ExecuteActionRequest,
    ) -> Result<DecisionResponse, ClientError> {
        self.post(session, Access::Public, &["agents", "execute"], Some(request))
            .await
    }

    // --- policies ---

    pub async fn get_policy(
        &self,
        session: &Session,
        wallet_id: &str,
    ) -> Result<Policy, ClientError> {
        self.get(session, Access::Public, &["policies", wallet_id], &[])
            .await
    }

    pub async fn update_policy(
        &self,
        session: &Session,
        update: &PolicyUpdate,
    ) -> Result<Option<Policy>, ClientError> {
        self.post(session, Access::Public, &["policies"], Some(update))
            .await
    }

    // --- swap ---

    pub async fn swap_tokens(&self, session: &Session) -> Result<TokenList, ClientError> {
        self.get(session, Access::Public, &["swap", "tokens"], &[])
            .await
    }

    pub async fn swap_quote(
        &self,
        session: &Session,
        request: &QuoteRequest,
    ) -> Result<QuoteResponse, ClientError> {
        self.post(session, Access::Public, &["swap", "quote"], Some(request))
            .await
    }

    pub async fn swap_execute(
        &self,
        session: &Session,
        request: &ExecuteSwapRequest,
    ) -> Result<SwapResult, ClientError> {
        self.post(session, Access::Public, &["swap", "execute"], Some(request))
            .await
    }

    // --- audit ---

    pub async fn audit_logs(
        &self,
        session: &Session,
        limit: u32,
    ) -> Result<Vec<AuditLogEntry>, ClientError> {
        self.get(
            session,
            Access::Public,
            &["audit", "logs"],
            &[("limit", limit.to_string())],
        )
        .await
    }
}
