use agentic_core::agent::{Agent, AgentType, CreateAgentRequest, Decision, ExecuteActionRequest};
use agentic_core::wallet::Wallet;
use rust_decimal::Decimal;

use crate::Context;
use crate::error::ClientError;
use crate::session::Session;
use crate::state::{Loadable, Synced};

/// Agents together with the wallets they reference, always fetched as a pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentsSnapshot {
    pub agents: Vec<Agent>,
    pub wallets: Vec<Wallet>,
}

pub struct AgentsView {
    ctx: Context,
    data: Synced<AgentsSnapshot>,
}

impl AgentsView {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            data: Synced::new(),
        }
    }

    pub async fn mount(&mut self, session: &Session) -> Result<(), ClientError> {
        self.load(session).await
    }

    /// Fetch agents and wallets concurrently; either failing fails the load.
    pub async fn load(&mut self, session: &Session) -> Result<(), ClientError> {
        let ticket = self.data.begin();
        let client = &self.ctx.client;
        let (agents, wallets) =
            tokio::join!(client.list_agents(session), client.list_wallets(session));
        match agents.and_then(|agents| wallets.map(|wallets| AgentsSnapshot { agents, wallets })) {
            Ok(snapshot) => {
                self.data.apply(ticket, snapshot);
                Ok(())
            }
            Err(e) => {
                self.data.fail(ticket);
                self.ctx.toaster.failed(&e, "Failed to load agents");
                Err(e)
            }
        }
    }

    pub fn state(&self) -> &Loadable<AgentsSnapshot> {
        self.data.state()
    }

    pub fn agents(&self) -> &[Agent] {
        self.data.get().map(|d| d.agents.as_slice()).unwrap_or(&[])
    }

    pub fn wallets(&self) -> &[Wallet] {
        self.data.get().map(|d| d.wallets.as_slice()).unwrap_or(&[])
    }

    /// Display name of the agent's wallet.
    pub fn wallet_label(&self, agent: &Agent) -> String {
        self.wallets()
            .iter()
            .find(|w| w.wallet_id == agent.wallet_id)
            .map(|w| w.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub async fn create(
        &mut self,
        session: &Session,
        name: &str,
        agent_type: AgentType,
        wallet_id: &str,
    ) -> Result<Agent, ClientError> {
        let (name, wallet_id) = (name.trim(), wallet_id.trim());
        if name.is_empty() || wallet_id.is_empty() {
            let err = ClientError::Validation("Please fill all required fields".to_string());
            self.ctx.toaster.failed(&err, "");
            return Err(err);
        }
        let request = CreateAgentRequest {
            name: name.to_string(),
            agent_type,
            wallet_id: wallet_id.to_string(),
        };
        match self.ctx.client.create_agent(session, &request).await {
            Ok(agent) => {
                tracing::info!(agent_id = %agent.agent_id, %agent_type, "agent created");
                self.ctx.toaster.success("Agent created successfully");
                let _ = self.load(session).await;
                Ok(agent)
            }
            Err(e) => {
                self.ctx.toaster.failed(&e, "Failed to create agent");
                Err(e)
            }
        }
    }

    /// Ask the agent to judge a transfer of `amount` from its wallet to another one.
    pub async fn execute(
        &mut self,
        session: &Session,
        agent_id: &str,
        amount: Decimal,
    ) -> Result<Decision, ClientError> {
        let request = match self.transfer_request(agent_id, amount) {
            Ok(request) => request,
            Err(e) => {
                self.ctx.toaster.failed(&e, "");
                return Err(e);
            }
        };

        self.ctx.toaster.info("Agent is analyzing the transaction...");
        let decision = match self.ctx.client.execute_agent(session, &request).await {
            Ok(resp) => Decision::from(resp),
            Err(e) => {
                self.ctx.toaster.failed(&e, "Failed to execute agent action");
                return Err(e);
            }
        };
        match &decision {
            Decision::Approved { decision_type, .. } => {
                tracing::info!(agent_id, %decision_type, "agent approved transfer");
                self.ctx
                    .toaster
                    .success(format!("Agent approved! Decision type: {decision_type}"));
            }
            Decision::Denied { reason } => {
                tracing::info!(agent_id, %reason, "agent denied transfer");
                self.ctx.toaster.warning(format!("Agent denied: {reason}"));
            }
        }
        Ok(decision)
    }

    fn transfer_request(
        &self,
        agent_id: &str,
        amount: Decimal,
    ) -> Result<ExecuteActionRequest, ClientError> {
        if amount <= Decimal::ZERO {
            return Err(ClientError::Validation(
                "Amount must be a positive number".to_string(),
            ));
        }
        let agent = self
            .agents()
            .iter()
            .find(|a| a.agent_id == agent_id)
            .ok_or_else(|| ClientError::Validation("Agent not found".to_string()))?;
        if !self.wallets().iter().any(|w| w.wallet_id == agent.wallet_id) {
            return Err(ClientError::Validation("Wallet not found".to_string()));
        }
        let target = self
            .wallets()
            .iter()
            .find(|w| w.wallet_id != agent.wallet_id)
            .ok_or_else(|| {
                ClientError::Validation("Need at least 2 wallets for testing".to_string())
            })?;
        Ok(ExecuteActionRequest::transfer(
            agent_id,
            target.pubkey.clone(),
            amount,
        ))
    }
}
