pub mod analytics;
mod commission;
mod drafts;
mod pitches;
mod prompts;
pub mod research;
mod seo;
pub mod transitions;
mod upgrade;

pub use commission::{AgentCommission, CommissionOutcome};
pub use drafts::{PublishRequest, QualityReview, ReviewVerdict};
pub use pitches::{ApprovalOutcome, PitchSubmission};

use std::sync::Arc;

use crate::ai::{ResearchCollector, ResearchEnvelope, ResearchQuery, TextGenerator};
use crate::feeds::HeadlineSource;
use crate::store::ContentStore;

/// The editorial workflow engine: owns every legal status transition of
/// pitch → draft → article and the generative side effects fired at
/// transition boundaries.
///
/// Store connections are pooled and short-lived; no method holds one across
/// a generator or research call.
#[derive(Clone)]
pub struct Newsroom {
    store: ContentStore,
    generator: Arc<dyn TextGenerator>,
    researcher: Arc<dyn ResearchCollector>,
    feeds: Arc<dyn HeadlineSource>,
}

impl Newsroom {
    pub fn new(
        store: ContentStore,
        generator: Arc<dyn TextGenerator>,
        researcher: Arc<dyn ResearchCollector>,
        feeds: Arc<dyn HeadlineSource>,
    ) -> Self {
        Self {
            store,
            generator,
            researcher,
            feeds,
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }
}

/// Generator stand-in when no completion API key is configured. Every call
/// fails, which routes callers onto their degraded paths (placeholder
/// bodies, explicit audit-failed notices).
pub struct DisabledGenerator;

#[async_trait::async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _messages: &[crate::ai::ChatMessage]) -> anyhow::Result<String> {
        anyhow::bail!("no text generation API configured (set OPENAI_API_KEY)")
    }
}

/// Research stand-in when no research API key is configured: always the
/// fixed fallback payload.
pub struct DisabledResearcher;

#[async_trait::async_trait]
impl ResearchCollector for DisabledResearcher {
    async fn collect(&self, query: &ResearchQuery) -> ResearchEnvelope {
        ResearchEnvelope::fallback(query)
    }
}
