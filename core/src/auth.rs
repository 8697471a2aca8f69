use std::fmt;

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix the backend gives to API keys.
pub const API_KEY_PREFIX: &str = "ak_";

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response of both login and register.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub token: String,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("token", &redact(&self.token))
            .finish()
    }
}

/// An API key as listed by `GET /auth/api-keys`. The secret is never part of the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    pub key_id: String,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /auth/api-keys`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
}

/// Response of `POST /auth/api-keys`: the only time the secret is visible.
#[derive(Clone, Serialize, Deserialize)]
pub struct CreatedApiKey {
    pub key_id: String,
    pub api_key: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl fmt::Debug for CreatedApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreatedApiKey")
            .field("key_id", &self.key_id)
            .field("api_key", &redact(&self.api_key))
            .field("name", &self.name)
            .field("permissions", &self.permissions)
            .finish()
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

/// Expiry of a bearer token, read from the `exp` claim of a JWT without verifying it.
///
/// Returns `None` for opaque tokens (API keys) and JWTs without `exp`; those never
/// expire client-side.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, payload, _sig) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let raw = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claim: ExpiryClaim = serde_json::from_slice(&raw).ok()?;
    DateTime::from_timestamp(claim.exp?, 0)
}

/// Whether a token that expires at `expires_at` must no longer be sent at `now`.
pub fn is_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.is_some_and(|exp| now >= exp)
}

/// Short, safe-to-print prefix of a secret.
pub fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(12).collect();
    if prefix.len() < secret.len() {
        format!("{prefix}...")
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn jwt_with(payload: &str) -> String {
        let enc = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.{}",
            enc.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            enc.encode(payload),
            "c2lnbmF0dXJl"
        )
    }

    #[test]
    fn jwt_expiry_is_decoded() {
        let token =
            jwt_with(r#"{"user_id":"u1","username":"ada","exp":1893456000,"iat":1893369600}"#);
        assert_eq!(
            token_expiry(&token),
            DateTime::from_timestamp(1_893_456_000, 0)
        );
    }

    #[test]
    fn opaque_tokens_have_no_expiry() {
        assert!(token_expiry("ak_Zm9vYmFyYmF6").is_none());
        assert!(token_expiry(&jwt_with(r#"{"user_id":"u1"}"#)).is_none());
        assert!(token_expiry("a.b.c.d").is_none());
        assert!(token_expiry("a.!!!.c").is_none());
    }

    #[test]
    fn expiry_check_is_inclusive() {
        let now = Utc::now();
        assert!(is_expired(Some(now), now));
        assert!(is_expired(Some(now - Duration::seconds(1)), now));
        assert!(!is_expired(Some(now + Duration::minutes(5)), now));
        assert!(!is_expired(None, now));
    }

    #[test]
    fn redact_never_prints_short_secrets() {
        assert_eq!(redact("ak_0123456789abcdef"), "ak_012345678...");
        assert_eq!(redact("short"), "***");
    }

    #[test]
    fn created_key_debug_hides_secret() {
        let key = CreatedApiKey {
            key_id: "k1".to_string(),
            api_key: "ak_supersecretvalue123".to_string(),
            name: "ci".to_string(),
            permissions: vec!["read".to_string()],
        };
        let printed = format!("{key:?}");
        assert!(!printed.contains("supersecretvalue123"));
    }
}
