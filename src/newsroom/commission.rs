use serde::{Deserialize, Serialize};

use super::{Newsroom, prompts};
use crate::ai::strip_code_fences;
use crate::error::{Error, Result};
use crate::store::pitches::NewPitch;
use crate::store::types::AgentRecord;

/// A generated pitch proposal as the model returns it.
#[derive(Debug, Deserialize)]
struct ProposedPitch {
    title: String,
    standfirst: String,
    angle: String,
    #[serde(default)]
    why_now: Option<String>,
    #[serde(default)]
    estimated_minutes: Option<i64>,
}

/// Per-agent result of a commissioning run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentCommission {
    pub agent_id: String,
    pub agent_name: String,
    pub created: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

/// Overall result of a commissioning run.
#[derive(Debug, Clone, Serialize)]
pub struct CommissionOutcome {
    pub pitches_created: usize,
    pub agents: Vec<AgentCommission>,
}

impl Newsroom {
    /// Scheduled commissioning: every active agent reads the day's headlines
    /// for its beat and proposes pitches, capped per run and by the agent's
    /// open-pitch limit. One agent failing never sinks the run; the outcome
    /// records what each agent produced or why it was skipped.
    pub async fn run_commission(&self) -> Result<CommissionOutcome> {
        let settings = self.store().get_settings()?;
        if !settings.cron_enabled {
            return Err(Error::Validation(
                "scheduled pitch generation is disabled in settings".to_string(),
            ));
        }

        let agents = self.store().list_agents(true)?;
        let results = futures::future::join_all(
            agents
                .iter()
                .map(|agent| self.commission_agent(agent, settings.max_pitches_per_run)),
        )
        .await;

        let mut outcome = CommissionOutcome {
            pitches_created: 0,
            agents: Vec::with_capacity(results.len()),
        };
        for per_agent in results {
            outcome.pitches_created += per_agent.created;
            outcome.agents.push(per_agent);
        }
        tracing::info!(
            "commission run created {} pitch(es) across {} agent(s)",
            outcome.pitches_created,
            outcome.agents.len()
        );
        Ok(outcome)
    }

    /// On-demand commissioning for one agent, bypassing the schedule toggle.
    pub async fn commission_one(&self, agent_id: &str) -> Result<AgentCommission> {
        let agent = self
            .store()
            .get_agent(agent_id)?
            .ok_or(Error::NotFound("agent"))?;
        if !agent.active {
            return Err(Error::Validation("agent is deactivated".to_string()));
        }
        let settings = self.store().get_settings()?;
        Ok(self
            .commission_agent(&agent, settings.max_pitches_per_run)
            .await)
    }

    /// One agent's slice of a run. Every failure mode, storage included,
    /// becomes a `skipped` note on the result; a partial insert keeps the
    /// pitches that made it in.
    async fn commission_agent(&self, agent: &AgentRecord, per_run_cap: i64) -> AgentCommission {
        let mut result = AgentCommission {
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            created: 0,
            skipped: None,
        };
        if let Err(e) = self.propose_and_insert(agent, per_run_cap, &mut result).await {
            tracing::warn!("commissioning failed for agent {}: {}", agent.id, e);
            result.skipped = Some(format!("storage error: {e}"));
        }
        result
    }

    async fn propose_and_insert(
        &self,
        agent: &AgentRecord,
        per_run_cap: i64,
        result: &mut AgentCommission,
    ) -> Result<()> {
        let open = self.store().count_open_pitches(&agent.id)?;
        let capacity = per_run_cap.min(agent.pitch_limit - open);
        if capacity <= 0 {
            result.skipped = Some(format!(
                "at pitch limit ({} open of {})",
                open, agent.pitch_limit
            ));
            return Ok(());
        }

        let headlines = self.feeds.headlines_for_focus(&agent.focus).await;
        let messages = prompts::pitch_generation(agent, &headlines, capacity);
        let reply = match self.generator.generate(&messages).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("pitch generation failed for agent {}: {}", agent.id, e);
                result.skipped = Some(format!("generation failed: {e}"));
                return Ok(());
            }
        };

        let proposals: Vec<ProposedPitch> = match serde_json::from_str(strip_code_fences(&reply)) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("unreadable pitch batch for agent {}: {}", agent.id, e);
                result.skipped = Some("generation returned unreadable pitches".to_string());
                return Ok(());
            }
        };

        for proposal in proposals.into_iter().take(capacity as usize) {
            if proposal.title.trim().is_empty()
                || proposal.standfirst.trim().is_empty()
                || proposal.angle.trim().is_empty()
            {
                continue;
            }
            self.store().insert_pitch(&NewPitch {
                agent_id: &agent.id,
                title: proposal.title.trim(),
                standfirst: proposal.standfirst.trim(),
                angle: proposal.angle.trim(),
                why_now: proposal.why_now.as_deref(),
                context_label: None,
                estimated_minutes: proposal.estimated_minutes,
            })?;
            result.created += 1;
        }
        Ok(())
    }
}
