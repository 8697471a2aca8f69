use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use agentic_core::auth::{
    AuthResponse, LoginRequest, RegisterRequest, is_expired, redact, token_expiry,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ClientError;

/// A bearer credential and what we know about it.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Read from the JWT `exp` claim; `None` for opaque API keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn new(token: impl Into<String>, username: Option<String>) -> Self {
        let token = token.into();
        let expires_at = token_expiry(&token);
        Self {
            token,
            username,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.expires_at, now)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &redact(&self.token))
            .field("username", &self.username)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Who the dashboard is acting as. Passed explicitly to every client call.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Credentials),
}

impl Session {
    pub fn from_token(token: impl Into<String>) -> Self {
        Session::Authenticated(Credentials::new(token, None))
    }

    /// Bearer to attach at `now`. An expired token is an error, never sent.
    pub fn bearer(&self, now: DateTime<Utc>) -> Result<Option<&str>, ClientError> {
        match self {
            Session::Anonymous => Ok(None),
            Session::Authenticated(creds) => match creds.expires_at {
                Some(expired_at) if creds.is_expired(now) => {
                    Err(ClientError::SessionExpired { expired_at })
                }
                _ => Ok(Some(creds.token.as_str())),
            },
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(creds) => creds.username.as_deref(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}

/// Where a session survives between runs.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<Credentials>, ClientError>;
    fn save(&self, credentials: &Credentials) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// JSON file readable by the owner only.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/agentic/session.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agentic")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

fn persistence(path: &Path, e: impl fmt::Display) -> ClientError {
    ClientError::Persistence(format!("{}: {e}", path.display()))
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Credentials>, ClientError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(persistence(&self.path, e)),
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| persistence(&self.path, e))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| persistence(parent, e))?;
        }
        let data =
            serde_json::to_string_pretty(credentials).map_err(|e| persistence(&self.path, e))?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&self.path)
            .map_err(|e| persistence(&self.path, e))?;
        file.write_all(data.as_bytes())
            .map_err(|e| persistence(&self.path, e))
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(persistence(&self.path, e)),
        }
    }
}

/// In-process store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<Credentials>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Option<Credentials> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<Credentials>, ClientError> {
        Ok(self.stored())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), ClientError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

/// Owns the persisted login and resolves the session to use for each call.
///
/// Resolution order: an API key from the environment, then the stored login,
/// then anonymous.
pub struct SessionStore {
    store: Box<dyn TokenStore>,
    persisted: Option<Credentials>,
    api_key: Option<String>,
    handle: SessionHandle,
}

/// The latest session, for tasks that outlive the call that started them.
/// The owning [`SessionStore`] republishes it on every login, logout and expiry.
#[derive(Clone, Default)]
pub struct SessionHandle(Arc<Mutex<Session>>);

impl SessionHandle {
    pub fn current(&self) -> Session {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn publish(&self, session: Session) {
        *self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = session;
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionHandle")
            .field(&self.current().is_authenticated())
            .finish()
    }
}

impl SessionStore {
    /// Restore whatever the store holds. An expired login is discarded.
    pub fn init(store: Box<dyn TokenStore>, api_key: Option<String>) -> Self {
        let persisted = match store.load() {
            Ok(Some(creds)) if creds.is_expired(Utc::now()) => {
                tracing::info!(
                    username = creds.username.as_deref().unwrap_or(""),
                    "stored session expired, discarding"
                );
                if let Err(e) = store.clear() {
                    tracing::warn!(error = %e, "could not clear expired session");
                }
                None
            }
            Ok(creds) => creds,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session, continuing anonymously");
                None
            }
        };
        let api_key = api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        let sessions = Self {
            store,
            persisted,
            api_key,
            handle: SessionHandle::default(),
        };
        sessions.publish();
        sessions
    }

    /// A live view of [`SessionStore::session`] that follows later changes.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    fn publish(&self) {
        self.handle.publish(self.session());
    }

    pub fn session(&self) -> Session {
        if let Some(key) = &self.api_key {
            return Session::Authenticated(Credentials::new(key.clone(), None));
        }
        match &self.persisted {
            Some(creds) => Session::Authenticated(creds.clone()),
            None => Session::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    /// True when the session comes from an environment API key rather than a login.
    pub fn uses_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn stored(&self) -> Option<&Credentials> {
        self.persisted.as_ref()
    }

    pub async fn login(
        &mut self,
        client: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        let resp = client
            .login(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.remember(&resp, username)?;
        tracing::info!(username, "logged in");
        Ok(resp)
    }

    pub async fn register(
        &mut self,
        client: &ApiClient,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let (username, email) = (username.trim(), email.trim());
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "Username, email and password are required".to_string(),
            ));
        }
        let resp = client
            .register(&RegisterRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.remember(&resp, username)?;
        tracing::info!(username, "registered");
        Ok(resp)
    }

    fn remember(&mut self, resp: &AuthResponse, username: &str) -> Result<(), ClientError> {
        let creds = Credentials::new(
            resp.token.clone(),
            Some(resp.username.clone().unwrap_or_else(|| username.to_string())),
        );
        self.store.save(&creds)?;
        self.persisted = Some(creds);
        self.publish();
        Ok(())
    }

    /// Forget the stored login. Idempotent.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.persisted = None;
        self.publish();
        self.store.clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Drop a login the backend or the clock says is no longer valid.
    pub fn expire(&mut self) {
        if self.persisted.take().is_some() {
            self.publish();
            tracing::info!("session expired, re-authentication required");
            if let Err(e) = self.store.clear() {
                tracing::warn!(error = %e, "could not clear expired session");
            }
        }
    }
}

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

#[cfg(not(unix))]
trait OpenOptionsExt {
    fn mode(&mut self, _mode: u32) -> &mut Self;
}

#[cfg(not(unix))]
impl OpenOptionsExt for std::fs::OpenOptions {
    fn mode(&mut self, _mode: u32) -> &mut Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, jwt_expiring_at};
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("agentic").join("session.json"));
        assert!(store.load().unwrap().is_none());

        let creds = Credentials::new("ak_live_0123456789", Some("ada".to_string()));
        store.save(&creds).unwrap();
        assert_eq!(store.load().unwrap(), Some(creds));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn env_api_key_wins_over_stored_login() {
        let memory = MemoryTokenStore::new();
        memory
            .save(&Credentials::new("stored", Some("ada".to_string())))
            .unwrap();
        let sessions = SessionStore::init(Box::new(memory), Some("ak_env".to_string()));
        assert_eq!(
            sessions.session().bearer(Utc::now()).unwrap(),
            Some("ak_env")
        );
        assert!(sessions.uses_api_key());
    }

    #[test]
    fn expired_stored_login_is_discarded_on_init() {
        let memory = MemoryTokenStore::new();
        let token = jwt_expiring_at(Utc::now() - Duration::hours(1));
        memory.save(&Credentials::new(token, None)).unwrap();

        let sessions = SessionStore::init(Box::new(memory.clone()), None);
        assert_eq!(sessions.session(), Session::Anonymous);
        assert!(memory.stored().is_none());
    }

    #[test]
    fn bearer_refuses_expired_token() {
        let exp = Utc::now() + Duration::minutes(10);
        let session = Session::from_token(jwt_expiring_at(exp));
        assert!(session.bearer(Utc::now()).unwrap().is_some());
        assert!(matches!(
            session.bearer(exp + Duration::seconds(1)),
            Err(ClientError::SessionExpired { .. })
        ));
    }

    #[tokio::test]
    async fn login_persists_and_logout_clears() {
        let transport = ScriptedTransport::new();
        let token = jwt_expiring_at(Utc::now() + Duration::hours(24));
        transport.reply(
            "POST",
            "auth/login",
            200,
            json!({"user_id": "u1", "username": "ada", "token": token}),
        );
        let client = ApiClient::new("http://backend.test", transport.clone());
        let memory = MemoryTokenStore::new();
        let mut sessions = SessionStore::init(Box::new(memory.clone()), None);

        sessions.login(&client, "ada", "pw").await.unwrap();
        assert_eq!(sessions.session().username(), Some("ada"));
        assert_eq!(memory.stored().map(|c| c.token), Some(token));

        sessions.logout().unwrap();
        assert!(memory.stored().is_none());
        let reopened = SessionStore::init(Box::new(memory), None);
        assert_eq!(reopened.session(), Session::Anonymous);
    }

    #[tokio::test]
    async fn blank_credentials_are_rejected_locally() {
        let transport = ScriptedTransport::new();
        let client = ApiClient::new("http://backend.test", transport.clone());
        let mut sessions = SessionStore::init(Box::new(MemoryTokenStore::new()), None);
        let err = sessions.login(&client, "  ", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn failed_login_keeps_previous_state() {
        let transport = ScriptedTransport::new();
        transport.reply("POST", "auth/login", 401, json!({"detail": "Invalid credentials"}));
        let client = ApiClient::new("http://backend.test", transport.clone());
        let mut sessions = SessionStore::init(Box::new(MemoryTokenStore::new()), None);
        let err = sessions.login(&client, "ada", "wrong").await.unwrap_err();
        assert_eq!(err.detail(), Some("Invalid credentials"));
        assert!(!sessions.is_authenticated());
    }

    struct ReadOnlyStore;

    impl TokenStore for ReadOnlyStore {
        fn load(&self) -> Result<Option<Credentials>, ClientError> {
            Ok(None)
        }

        fn save(&self, _credentials: &Credentials) -> Result<(), ClientError> {
            Err(ClientError::Persistence("read-only".to_string()))
        }

        fn clear(&self) -> Result<(), ClientError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn login_that_cannot_be_saved_stays_anonymous() {
        let transport = ScriptedTransport::new();
        let token = jwt_expiring_at(Utc::now() + Duration::hours(24));
        transport.reply(
            "POST",
            "auth/login",
            200,
            json!({"user_id": "u1", "username": "ada", "token": token}),
        );
        let client = ApiClient::new("http://backend.test", transport.clone());
        let mut sessions = SessionStore::init(Box::new(ReadOnlyStore), None);

        let err = sessions.login(&client, "ada", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Persistence(_)));
        assert!(!sessions.is_authenticated());
        assert!(sessions.stored().is_none());
    }
}
