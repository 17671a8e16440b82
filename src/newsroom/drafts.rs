use serde::Deserialize;

use super::{Newsroom, prompts, transitions};
use crate::ai::strip_code_fences;
use crate::error::{Error, Result};
use crate::store::articles::NewArticle;
use crate::store::types::{ArticleRecord, DraftRecord, DraftStatus};

/// Editor-supplied fields for publishing an approved draft. Title and
/// standfirst fall back to the draft, then to the originating pitch;
/// reading time falls back to the pitch's estimate.
pub struct PublishRequest {
    pub slug: String,
    pub title: Option<String>,
    pub standfirst: Option<String>,
    pub byline: Option<String>,
    pub sport: Option<String>,
    pub reading_minutes: Option<i64>,
    pub featured: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewVerdict {
    Ready,
    Revise,
    Reject,
}

/// Structured outcome of an automated quality review.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct QualityReview {
    pub verdict: ReviewVerdict,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub required_fixes: Vec<String>,
}

fn valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl Newsroom {
    /// Editor edit of a draft's working copy, allowed in any status.
    pub fn update_draft(
        &self,
        draft_id: &str,
        title: Option<&str>,
        standfirst: Option<&str>,
        content: Option<&str>,
    ) -> Result<DraftRecord> {
        self.store()
            .update_draft_fields(draft_id, title, standfirst, content)?;
        self.store()
            .get_draft(draft_id)?
            .ok_or(Error::NotFound("draft"))
    }

    /// Agent edit of a draft: only while the draft is back in the agent's
    /// hands, and only on the agent's own draft.
    pub fn agent_update_draft(
        &self,
        agent_id: &str,
        draft_id: &str,
        title: Option<&str>,
        standfirst: Option<&str>,
        content: Option<&str>,
    ) -> Result<DraftRecord> {
        let draft = self
            .store()
            .get_draft(draft_id)?
            .ok_or(Error::NotFound("draft"))?;
        let pitch = self
            .store()
            .get_pitch(&draft.pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;
        if pitch.agent_id != agent_id {
            return Err(Error::Forbidden(
                "draft belongs to another agent".to_string(),
            ));
        }
        if !transitions::draft_editable_by_agent(draft.status) {
            return Err(Error::Validation(format!(
                "draft is {} and not editable by its agent",
                draft.status.as_str()
            )));
        }
        self.update_draft(draft_id, title, standfirst, content)
    }

    pub fn submit_draft_for_review(&self, draft_id: &str) -> Result<DraftRecord> {
        self.move_draft(draft_id, DraftStatus::Submitted, None)
    }

    pub fn move_draft_to_review(&self, draft_id: &str) -> Result<DraftRecord> {
        self.move_draft(draft_id, DraftStatus::InReview, None)
    }

    pub fn approve_draft(&self, draft_id: &str) -> Result<DraftRecord> {
        self.move_draft(draft_id, DraftStatus::Approved, None)
    }

    /// Reopen an approved draft for editing. Refused once published: the
    /// published copy is updated through the update-published flow instead.
    pub fn unapprove_draft(&self, draft_id: &str) -> Result<DraftRecord> {
        if self.store().get_article_by_draft(draft_id)?.is_some() {
            return Err(Error::Conflict(
                "draft is already published; edit and re-sync instead".to_string(),
            ));
        }
        self.move_draft(draft_id, DraftStatus::Draft, None)
    }

    pub fn request_draft_revision(&self, draft_id: &str, notes: &str) -> Result<DraftRecord> {
        if notes.trim().is_empty() {
            return Err(Error::Validation(
                "revision feedback for the agent is required".to_string(),
            ));
        }
        self.move_draft(draft_id, DraftStatus::RevisionRequested, Some(notes))
    }

    fn move_draft(
        &self,
        draft_id: &str,
        to: DraftStatus,
        notes: Option<&str>,
    ) -> Result<DraftRecord> {
        let draft = self
            .store()
            .get_draft(draft_id)?
            .ok_or(Error::NotFound("draft"))?;
        transitions::ensure_draft_transition(draft.status, to)?;
        self.store().set_draft_status(draft_id, to, notes)?;
        self.store()
            .get_draft(draft_id)?
            .ok_or(Error::NotFound("draft"))
    }

    /// Generative revision honoring feedback. The draft's status is left
    /// unchanged; a failed generation writes nothing.
    pub async fn refine_draft(&self, draft_id: &str, feedback: &str) -> Result<DraftRecord> {
        if feedback.trim().is_empty() {
            return Err(Error::Validation("feedback is required".to_string()));
        }
        let draft = self
            .store()
            .get_draft(draft_id)?
            .ok_or(Error::NotFound("draft"))?;
        let pitch = self
            .store()
            .get_pitch(&draft.pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;
        let agent = self
            .store()
            .get_agent(&pitch.agent_id)?
            .ok_or(Error::NotFound("agent"))?;

        let messages = prompts::refine(&draft.content, feedback, &agent);
        let revised = self
            .generator
            .generate(&messages)
            .await
            .map_err(|e| Error::Upstream(format!("refinement failed: {e}")))?;
        if revised.trim().is_empty() {
            return Err(Error::Upstream("refinement returned an empty body".to_string()));
        }

        self.store()
            .update_draft_fields(draft_id, None, None, Some(&revised))?;
        self.store()
            .get_draft(draft_id)?
            .ok_or(Error::NotFound("draft"))
    }

    /// Automated quality review. Advisory only: the verdict is returned to
    /// the editor and never moves the draft itself.
    pub async fn review_draft(&self, draft_id: &str) -> Result<QualityReview> {
        let draft = self
            .store()
            .get_draft(draft_id)?
            .ok_or(Error::NotFound("draft"))?;
        let pitch = self
            .store()
            .get_pitch(&draft.pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;

        let title = draft.title.as_deref().unwrap_or(&pitch.title);
        let standfirst = draft.standfirst.as_deref().unwrap_or(&pitch.standfirst);
        let messages = prompts::quality_review(title, standfirst, &draft.content);
        let reply = self
            .generator
            .generate(&messages)
            .await
            .map_err(|e| Error::Upstream(format!("quality review failed: {e}")))?;

        serde_json::from_str(strip_code_fences(&reply))
            .map_err(|e| Error::Upstream(format!("unreadable review verdict: {e}")))
    }

    /// Publish an approved draft as an article. Inserting the article and
    /// marking the draft approved happen in one storage transaction; a taken
    /// slug or an already-published draft conflicts without side effects.
    pub fn publish_draft(&self, draft_id: &str, req: &PublishRequest) -> Result<ArticleRecord> {
        if !valid_slug(&req.slug) {
            return Err(Error::Validation(format!(
                "invalid slug '{}': lowercase letters, digits and interior hyphens only",
                req.slug
            )));
        }

        let draft = self
            .store()
            .get_draft(draft_id)?
            .ok_or(Error::NotFound("draft"))?;
        if draft.status != DraftStatus::Approved {
            return Err(Error::Validation(format!(
                "only approved drafts can be published (draft is {})",
                draft.status.as_str()
            )));
        }
        let pitch = self
            .store()
            .get_pitch(&draft.pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;

        let title = req
            .title
            .as_deref()
            .or(draft.title.as_deref())
            .unwrap_or(&pitch.title);
        let standfirst = req
            .standfirst
            .as_deref()
            .or(draft.standfirst.as_deref())
            .unwrap_or(&pitch.standfirst);

        self.store().publish_article(&NewArticle {
            draft_id,
            slug: &req.slug,
            title,
            standfirst,
            content: &draft.content,
            context_label: pitch.context_label.as_deref(),
            byline: req.byline.as_deref(),
            reading_minutes: req.reading_minutes.or(pitch.estimated_minutes),
            featured: req.featured,
            sport: req.sport.as_deref(),
        })
    }

    /// Push the draft's current copy onto its published article, then clear
    /// the editor notes that drove the revision.
    pub fn update_published(&self, draft_id: &str) -> Result<ArticleRecord> {
        let draft = self
            .store()
            .get_draft(draft_id)?
            .ok_or(Error::NotFound("draft"))?;
        let article = self
            .store()
            .get_article_by_draft(draft_id)?
            .ok_or(Error::NotFound("published article for draft"))?;

        let title = draft.title.as_deref().unwrap_or(&article.title);
        let standfirst = draft.standfirst.as_deref().unwrap_or(&article.standfirst);
        self.store()
            .sync_article_from_draft(&article.id, title, standfirst, &draft.content)?;
        self.store().clear_draft_notes(draft_id)?;

        self.store()
            .get_article(&article.id)?
            .ok_or(Error::NotFound("article"))
    }
}
