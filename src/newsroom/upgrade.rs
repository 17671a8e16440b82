use super::{Newsroom, prompts, research};
use crate::ai::ResearchQuery;
use crate::error::{Error, Result};
use crate::store::types::{DraftRecord, DraftStatus};

impl Newsroom {
    /// Research-grounded rework of a published article. Fresh anchors are
    /// collected, the body is rewritten around them, and the result lands on
    /// the article's draft in `submitted` so it re-enters the review queue.
    /// The published article row is never touched; the rewrite only goes
    /// live through the normal approve-then-sync path.
    ///
    /// Generator failure writes nothing. Research failure is not fatal: the
    /// rewrite proceeds without anchors and the editor notes say so.
    pub async fn upgrade_article(&self, article_id: &str) -> Result<DraftRecord> {
        let article = self
            .store()
            .get_article(article_id)?
            .ok_or(Error::NotFound("article"))?;
        let draft = self
            .store()
            .get_draft(&article.draft_id)?
            .ok_or(Error::NotFound("draft"))?;

        let query = ResearchQuery {
            title: article.title.clone(),
            angle: article.standfirst.clone(),
            athlete: research::extract_athlete(&article.title),
            context: article.context_label.clone(),
        };
        let envelope = self.researcher.collect(&query).await;

        let messages =
            prompts::upgrade(&article.title, &article.standfirst, &article.content, &envelope);
        let revised = self
            .generator
            .generate(&messages)
            .await
            .map_err(|e| Error::Upstream(format!("upgrade generation failed: {e}")))?;
        if revised.trim().is_empty() {
            return Err(Error::Upstream("upgrade returned an empty body".to_string()));
        }

        let notes = if envelope.anchors.is_empty() {
            "Upgraded without research anchors (research unavailable); verify claims manually."
                .to_string()
        } else {
            format!(
                "Upgraded with {} research anchor(s); verify before re-approving.",
                envelope.anchors.len()
            )
        };
        self.store()
            .replace_draft_content(&draft.id, &revised, DraftStatus::Submitted, &notes)?;

        tracing::info!("article {} upgraded, draft {} back in review", article_id, draft.id);
        self.store()
            .get_draft(&draft.id)?
            .ok_or(Error::NotFound("draft"))
    }
}
