use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Lifecycle of a pitch from agent submission to editorial decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchStatus {
    Submitted,
    InReview,
    Approved,
    Rejected,
    RevisionRequested,
}

impl PitchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PitchStatus::Submitted => "submitted",
            PitchStatus::InReview => "in_review",
            PitchStatus::Approved => "approved",
            PitchStatus::Rejected => "rejected",
            PitchStatus::RevisionRequested => "revision_requested",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "submitted" => Ok(PitchStatus::Submitted),
            "in_review" => Ok(PitchStatus::InReview),
            "approved" => Ok(PitchStatus::Approved),
            "rejected" => Ok(PitchStatus::Rejected),
            "revision_requested" => Ok(PitchStatus::RevisionRequested),
            other => Err(Error::Validation(format!("unknown pitch status: {other}"))),
        }
    }
}

/// Lifecycle of a draft from creation through editorial approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Draft,
    Submitted,
    InReview,
    Approved,
    RevisionRequested,
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Draft => "draft",
            DraftStatus::Submitted => "submitted",
            DraftStatus::InReview => "in_review",
            DraftStatus::Approved => "approved",
            DraftStatus::RevisionRequested => "revision_requested",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "draft" => Ok(DraftStatus::Draft),
            "submitted" => Ok(DraftStatus::Submitted),
            "in_review" => Ok(DraftStatus::InReview),
            "approved" => Ok(DraftStatus::Approved),
            "revision_requested" => Ok(DraftStatus::RevisionRequested),
            other => Err(Error::Validation(format!("unknown draft status: {other}"))),
        }
    }
}

/// Verdict of an automated SEO hygiene audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeoAuditStatus {
    Pending,
    Pass,
    Flagged,
    Failed,
}

impl SeoAuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeoAuditStatus::Pending => "pending",
            SeoAuditStatus::Pass => "pass",
            SeoAuditStatus::Flagged => "flagged",
            SeoAuditStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "pending" => Ok(SeoAuditStatus::Pending),
            "pass" => Ok(SeoAuditStatus::Pass),
            "flagged" => Ok(SeoAuditStatus::Flagged),
            "failed" => Ok(SeoAuditStatus::Failed),
            other => Err(Error::Validation(format!("unknown audit status: {other}"))),
        }
    }
}

/// Role carried by an API token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Editor,
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Editor => "editor",
            Role::Agent => "agent",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "editor" => Ok(Role::Editor),
            "agent" => Ok(Role::Agent),
            other => Err(Error::Validation(format!("unknown role: {other}"))),
        }
    }
}

/// A contributor persona. Deactivated via `active`, never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub focus: String,
    pub constraints: String,
    pub active: bool,
    pub pitch_limit: i64,
    pub user_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A proposed story awaiting editorial review.
#[derive(Debug, Clone, Serialize)]
pub struct PitchRecord {
    pub id: String,
    pub agent_id: String,
    pub title: String,
    pub standfirst: String,
    pub angle: String,
    pub why_now: Option<String>,
    pub context_label: Option<String>,
    pub estimated_minutes: Option<i64>,
    pub status: PitchStatus,
    pub editor_notes: Option<String>,
    /// Versioned research envelope, kept apart from free-text notes.
    pub research_json: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Editable article body belonging to exactly one pitch.
#[derive(Debug, Clone, Serialize)]
pub struct DraftRecord {
    pub id: String,
    pub pitch_id: String,
    pub title: Option<String>,
    pub standfirst: Option<String>,
    pub content: String,
    pub status: DraftStatus,
    pub editor_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A published piece, derived from exactly one approved draft.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleRecord {
    pub id: String,
    pub draft_id: String,
    pub slug: String,
    pub title: String,
    pub standfirst: String,
    pub content: String,
    pub context_label: Option<String>,
    pub byline: Option<String>,
    pub image_url: Option<String>,
    pub reading_minutes: Option<i64>,
    pub hidden: bool,
    pub featured: bool,
    pub display_order: i64,
    pub sport: Option<String>,
    pub published_at: String,
    pub scheduled_at: Option<String>,
    pub meta_description: Option<String>,
    pub canonical_url: Option<String>,
    pub noindex: bool,
    pub seo_status: SeoAuditStatus,
    pub seo_notes: Option<String>,
    pub seo_reviewed_at: Option<String>,
}

/// Append-only analytics event.
#[derive(Debug, Clone, Serialize)]
pub struct PageViewRecord {
    pub id: i64,
    pub article_id: String,
    pub session_id: Option<String>,
    pub duration_secs: Option<i64>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Singleton global configuration row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub cron_enabled: bool,
    pub max_pitches_per_run: i64,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            cron_enabled: true,
            max_pitches_per_run: 1,
        }
    }
}

/// Metadata for a stored API token (the raw token is never persisted).
#[derive(Debug, Clone, Serialize)]
pub struct ApiTokenRecord {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub agent_id: Option<String>,
    pub created_at: String,
}
