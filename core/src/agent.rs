use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decision engine behind an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentType {
    #[default]
    RuleBased,
    LlmDriven,
}

impl AgentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::RuleBased => "rule-based",
            AgentType::LlmDriven => "llm-driven",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "rule-based" | "rule" => Ok(AgentType::RuleBased),
            "llm-driven" | "llm" => Ok(AgentType::LlmDriven),
            other => Err(format!(
                "unknown agent type '{other}' (expected 'rule-based' or 'llm-driven')"
            )),
        }
    }
}

/// Policy snapshot attached to an agent when it was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPolicy {
    pub max_transaction_amount: Decimal,
    pub auto_approve_below: Decimal,
    #[serde(default)]
    pub require_simulation: bool,
}

/// An agent as listed by `GET /agents`.
///
/// `policy` is absent on the record returned by `POST /agents`; the list carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub agent_type: AgentType,
    pub wallet_id: String,
    #[serde(default)]
    pub policy: Option<AgentPolicy>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /agents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub agent_type: AgentType,
    pub wallet_id: String,
}

/// Parameters of a transfer the agent is asked to judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferParams {
    /// Destination public key
    pub to: String,
    pub amount: Decimal,
}

/// Body of `POST /agents/execute`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteActionRequest {
    pub agent_id: String,
    pub action_type: String,
    pub params: TransferParams,
}

impl ExecuteActionRequest {
    pub fn transfer(agent_id: impl Into<String>, to: impl Into<String>, amount: Decimal) -> Self {
        Self {
            agent_id: agent_id.into(),
            action_type: "transfer".to_string(),
            params: TransferParams {
                to: to.into(),
                amount,
            },
        }
    }
}

/// Raw response of `POST /agents/execute`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionResponse {
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub decision_type: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub auto_execute: Option<bool>,
}

/// Classified outcome of a simulated agent decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decision {
    Approved {
        decision_type: String,
        auto_execute: bool,
    },
    Denied {
        reason: String,
    },
}

impl From<DecisionResponse> for Decision {
    fn from(resp: DecisionResponse) -> Self {
        if resp.approved {
            Decision::Approved {
                decision_type: resp.decision_type.unwrap_or_else(|| "unknown".to_string()),
                auto_execute: resp.auto_execute.unwrap_or(false),
            }
        } else {
            Decision::Denied {
                reason: resp
                    .reason
                    .unwrap_or_else(|| "no reason given".to_string()),
            }
        }
    }
}
