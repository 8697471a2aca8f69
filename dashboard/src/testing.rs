use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::error::ClientError;
use crate::transport::{ApiRequest, ApiResponse, Transport};
use crate::{ApiClient, Context, DashboardConfig};

pub const BACKEND: &str = "http://backend.test";

#[derive(Clone)]
struct Reply {
    delay: Duration,
    outcome: Result<ApiResponse, ClientError>,
}

/// Canned backend keyed by `"METHOD /api/<path>"`. The last reply queued for a
/// route repeats; unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    sent: Mutex<Vec<ApiRequest>>,
}

fn key(method: &str, path: &str) -> String {
    format!("{} /api/{}", method.to_ascii_uppercase(), path.trim_start_matches('/'))
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: &str, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry(key(method, path))
            .or_default()
            .push_back(reply);
    }

    pub fn reply(&self, method: &str, path: &str, status: u16, body: Value) {
        self.reply_after(method, path, Duration::ZERO, status, body);
    }

    pub fn reply_after(&self, method: &str, path: &str, delay: Duration, status: u16, body: Value) {
        self.push(
            method,
            path,
            Reply {
                delay,
                outcome: Ok(ApiResponse { status, body }),
            },
        );
    }

    pub fn fail(&self, method: &str, path: &str, err: ClientError) {
        self.push(
            method,
            path,
            Reply {
                delay: Duration::ZERO,
                outcome: Err(err),
            },
        );
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        let wanted = key(method, path);
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|r| format!("{} {}", r.method, r.url.path()) == wanted)
            .count()
    }

    pub fn last_body(&self, method: &str, path: &str) -> Option<Value> {
        let wanted = key(method, path);
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| format!("{} {}", r.method, r.url.path()) == wanted)
            .and_then(|r| r.body.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let route = format!("{} {}", request.method, request.url.path());
        self.sent.lock().unwrap().push(request);
        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&route) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        match reply {
            Some(reply) => {
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }
                reply.outcome
            }
            None => Ok(ApiResponse {
                status: 404,
                body: json!({"detail": "Not Found"}),
            }),
        }
    }
}

pub fn context(transport: &Arc<ScriptedTransport>) -> Context {
    let config = DashboardConfig::with_backend_url(BACKEND);
    Context::new(ApiClient::new(BACKEND, transport.clone()), config)
}

pub fn jwt_expiring_at(exp: DateTime<Utc>) -> String {
    let enc = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let payload = json!({"user_id": "u1", "username": "ada", "exp": exp.timestamp()});
    format!(
        "{}.{}.sig",
        enc.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        enc.encode(payload.to_string())
    )
}

pub fn wallet_json(id: &str, name: &str, sol: f64) -> Value {
    json!({
        "wallet_id": id,
        "name": name,
        "pubkey": format!("Pk{id}"),
        "key_management_type": "encrypted",
        "created_at": "2026-01-05T10:00:00+00:00",
        "balances": {"SOL": sol}
    })
}

pub fn agent_json(id: &str, name: &str, wallet_id: &str) -> Value {
    json!({
        "agent_id": id,
        "name": name,
        "agent_type": "rule-based",
        "wallet_id": wallet_id,
        "policy": {
            "max_transaction_amount": 1.0,
            "auto_approve_below": 0.1,
            "require_simulation": true
        },
        "status": "active",
        "created_at": "2026-01-06T09:00:00+00:00"
    })
}

pub fn audit_json(action: &str, success: bool, minute: u32) -> Value {
    json!({
        "wallet_id": "w1",
        "action_type": action,
        "params": {"amount": 1},
        "result": if success { json!({"success": true, "signature": format!("sig{minute}")}) }
                  else { json!({"success": false, "error": "failed"}) },
        "success": success,
        "timestamp": format!("2026-03-01T12:{minute:02}:00+00:00")
    })
}
