use serde::Deserialize;

use super::{Newsroom, prompts};
use crate::ai::strip_code_fences;
use crate::error::{Error, Result};
use crate::store::types::{ArticleRecord, SeoAuditStatus};

#[derive(Deserialize)]
struct AuditReply {
    verdict: String,
    #[serde(default)]
    notes: Vec<String>,
}

impl Newsroom {
    /// Automated SEO hygiene audit of a published article. Always records an
    /// outcome on the article: pass or flagged when the audit ran, `failed`
    /// with the error as its note when the generator did not. A failed audit
    /// is a stored result, not a request error.
    pub async fn audit_article_seo(&self, article_id: &str) -> Result<ArticleRecord> {
        let article = self
            .store()
            .get_article(article_id)?
            .ok_or(Error::NotFound("article"))?;

        let messages = prompts::seo_audit(&article);
        let (status, notes) = match self.generator.generate(&messages).await {
            Ok(reply) => match serde_json::from_str::<AuditReply>(strip_code_fences(&reply)) {
                Ok(audit) if audit.verdict == "pass" => {
                    (SeoAuditStatus::Pass, audit.notes.join("\n"))
                }
                Ok(audit) if audit.verdict == "flagged" => {
                    (SeoAuditStatus::Flagged, audit.notes.join("\n"))
                }
                Ok(audit) => (
                    SeoAuditStatus::Failed,
                    format!("Audit failed: unknown verdict '{}'", audit.verdict),
                ),
                Err(e) => (
                    SeoAuditStatus::Failed,
                    format!("Audit failed: unreadable verdict ({e})"),
                ),
            },
            Err(e) => (SeoAuditStatus::Failed, format!("Audit failed: {e}")),
        };

        if status == SeoAuditStatus::Failed {
            tracing::warn!("seo audit for article {} recorded as failed", article_id);
        }
        self.store().record_seo_audit(article_id, status, &notes)?;
        self.store()
            .get_article(article_id)?
            .ok_or(Error::NotFound("article"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newsroom::testutil::{ScriptedGenerator, StubResearcher, newsroom_with};
    use crate::newsroom::{PitchSubmission, PublishRequest};

    async fn published(generator: ScriptedGenerator) -> (Newsroom, String) {
        let room = newsroom_with(
            generator,
            StubResearcher {
                anchors: 0,
                degraded: false,
            },
        );
        let agent = room.store().create_agent("A", "golf", "", 3, None).unwrap();
        let pitch = room
            .submit_pitch(
                &agent.id,
                &PitchSubmission {
                    title: "Links golf in the wind".to_string(),
                    standfirst: "Standfirst".to_string(),
                    angle: "Angle".to_string(),
                    why_now: None,
                    context_label: None,
                    estimated_minutes: None,
                },
            )
            .unwrap();
        let draft_id = room.approve_pitch(&pitch.id).await.unwrap().draft.id;
        room.submit_draft_for_review(&draft_id).unwrap();
        room.approve_draft(&draft_id).unwrap();
        let article = room
            .publish_draft(
                &draft_id,
                &PublishRequest {
                    slug: "links-golf".to_string(),
                    title: None,
                    standfirst: None,
                    byline: None,
                    sport: Some("golf".to_string()),
                    reading_minutes: None,
                    featured: false,
                },
            )
            .unwrap();
        (room, article.id)
    }

    #[tokio::test]
    async fn passing_audit_is_recorded() {
        let generator = ScriptedGenerator::new(vec![
            Ok("<p>body</p>".to_string()),
            Ok("{\"verdict\":\"pass\",\"notes\":[\"clean headings\"]}".to_string()),
        ]);
        let (room, article_id) = published(generator).await;

        let article = room.audit_article_seo(&article_id).await.unwrap();
        assert_eq!(article.seo_status, SeoAuditStatus::Pass);
        assert_eq!(article.seo_notes.as_deref(), Some("clean headings"));
        assert!(article.seo_reviewed_at.is_some());
    }

    #[tokio::test]
    async fn flagged_audit_keeps_its_notes() {
        let generator = ScriptedGenerator::new(vec![
            Ok("<p>body</p>".to_string()),
            Ok("```json\n{\"verdict\":\"flagged\",\"notes\":[\"missing meta description\",\
                \"title repeats the slug\"]}\n```"
                .to_string()),
        ]);
        let (room, article_id) = published(generator).await;

        let article = room.audit_article_seo(&article_id).await.unwrap();
        assert_eq!(article.seo_status, SeoAuditStatus::Flagged);
        assert!(article.seo_notes.as_deref().unwrap().contains("meta description"));
    }

    #[tokio::test]
    async fn generator_failure_is_a_stored_failed_audit_not_an_error() {
        let generator = ScriptedGenerator::new(vec![
            Ok("<p>body</p>".to_string()),
            Err("timeout".to_string()),
        ]);
        let (room, article_id) = published(generator).await;

        let article = room.audit_article_seo(&article_id).await.unwrap();
        assert_eq!(article.seo_status, SeoAuditStatus::Failed);
        assert!(article.seo_notes.as_deref().unwrap().starts_with("Audit failed:"));
    }

    #[tokio::test]
    async fn unreadable_verdict_is_a_failed_audit() {
        let generator = ScriptedGenerator::new(vec![
            Ok("<p>body</p>".to_string()),
            Ok("looks fine to me!".to_string()),
        ]);
        let (room, article_id) = published(generator).await;

        let article = room.audit_article_seo(&article_id).await.unwrap();
        assert_eq!(article.seo_status, SeoAuditStatus::Failed);
    }
}
