mod gemini;
mod openai;

pub use gemini::GeminiResearcher;
pub use openai::OpenAiGenerator;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Generative calls can take tens of seconds; the platform aborts past this.
pub const UPSTREAM_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A generative text completion API (pitch text, article bodies, revisions,
/// quality reviews, SEO audits).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Input to the research collector.
#[derive(Debug, Clone)]
pub struct ResearchQuery {
    pub title: String,
    pub angle: String,
    pub athlete: Option<String>,
    pub context: Option<String>,
}

/// A concrete, sourced fact gathered to ground generated prose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anchor {
    pub fact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Versioned research payload persisted on the pitch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchEnvelope {
    pub version: u32,
    pub athlete: Option<String>,
    pub anchors: Vec<Anchor>,
    /// True when the collector fell back because the upstream was unavailable.
    pub degraded: bool,
    pub collected_at: String,
}

impl ResearchEnvelope {
    pub const VERSION: u32 = 1;

    /// The fixed payload used when the upstream research API is unavailable.
    pub fn fallback(query: &ResearchQuery) -> Self {
        Self {
            version: Self::VERSION,
            athlete: query.athlete.clone(),
            anchors: Vec::new(),
            degraded: true,
            collected_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A search-grounded research API. Never fails: implementations degrade to
/// `ResearchEnvelope::fallback` when the upstream errors.
#[async_trait]
pub trait ResearchCollector: Send + Sync {
    async fn collect(&self, query: &ResearchQuery) -> ResearchEnvelope;
}

/// Models often wrap JSON in ```json fences despite instructions.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}
