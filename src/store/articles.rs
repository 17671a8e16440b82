use rusqlite::{Row, params};

use super::{ContentStore, is_unique_violation, now_rfc3339};
use crate::error::{Error, Result};
use crate::store::types::{ArticleRecord, DraftStatus, SeoAuditStatus};

const ARTICLE_COLS: &str = "id, draft_id, slug, title, standfirst, content, context_label, \
     byline, image_url, reading_minutes, hidden, featured, display_order, sport, published_at, \
     scheduled_at, meta_description, canonical_url, noindex, seo_status, seo_notes, seo_reviewed_at";

fn map_article(row: &Row) -> rusqlite::Result<ArticleRecord> {
    let seo_status_str: String = row.get(19)?;
    Ok(ArticleRecord {
        id: row.get(0)?,
        draft_id: row.get(1)?,
        slug: row.get(2)?,
        title: row.get(3)?,
        standfirst: row.get(4)?,
        content: row.get(5)?,
        context_label: row.get(6)?,
        byline: row.get(7)?,
        image_url: row.get(8)?,
        reading_minutes: row.get(9)?,
        hidden: row.get::<_, i64>(10)? != 0,
        featured: row.get::<_, i64>(11)? != 0,
        display_order: row.get(12)?,
        sport: row.get(13)?,
        published_at: row.get(14)?,
        scheduled_at: row.get(15)?,
        meta_description: row.get(16)?,
        canonical_url: row.get(17)?,
        noindex: row.get::<_, i64>(18)? != 0,
        seo_status: SeoAuditStatus::parse(&seo_status_str).unwrap_or(SeoAuditStatus::Pending),
        seo_notes: row.get(20)?,
        seo_reviewed_at: row.get(21)?,
    })
}

pub struct NewArticle<'a> {
    pub draft_id: &'a str,
    pub slug: &'a str,
    pub title: &'a str,
    pub standfirst: &'a str,
    pub content: &'a str,
    pub context_label: Option<&'a str>,
    pub byline: Option<&'a str>,
    pub reading_minutes: Option<i64>,
    pub featured: bool,
    pub sport: Option<&'a str>,
}

impl ContentStore {
    /// Insert the article and mark its draft approved, as one transaction.
    /// A taken slug or an already-published draft is a `Conflict`.
    pub fn publish_article(&self, article: &NewArticle) -> Result<ArticleRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_rfc3339();

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let inserted = tx.execute(
            "INSERT INTO articles (id, draft_id, slug, title, standfirst, content,
                 context_label, byline, reading_minutes, featured, sport,
                 published_at, seo_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 'pending')",
            params![
                id,
                article.draft_id,
                article.slug,
                article.title,
                article.standfirst,
                article.content,
                article.context_label,
                article.byline,
                article.reading_minutes,
                article.featured as i64,
                article.sport,
                now,
            ],
        );
        if let Err(e) = inserted {
            if is_unique_violation(&e) {
                return Err(Error::Conflict(format!(
                    "slug '{}' is already in use or the draft is already published",
                    article.slug
                )));
            }
            return Err(e.into());
        }

        let updated = tx.execute(
            "UPDATE drafts SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![DraftStatus::Approved.as_str(), now, article.draft_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("draft"));
        }

        tx.commit()?;
        drop(conn);

        tracing::info!("published article '{}' ({})", article.slug, id);
        self.get_article(&id)?.ok_or(Error::NotFound("article"))
    }

    pub fn get_article(&self, id: &str) -> Result<Option<ArticleRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {ARTICLE_COLS} FROM articles WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], map_article)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn get_article_by_slug(&self, slug: &str) -> Result<Option<ArticleRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {ARTICLE_COLS} FROM articles WHERE slug = ?1"))?;
        let mut rows = stmt.query_map(params![slug], map_article)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn get_article_by_draft(&self, draft_id: &str) -> Result<Option<ArticleRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ARTICLE_COLS} FROM articles WHERE draft_id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![draft_id], map_article)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Public listing: hidden articles excluded, featured first, then display
    /// order, then recency.
    pub fn list_public_articles(&self, sport: Option<&str>) -> Result<Vec<ArticleRecord>> {
        let conn = self.conn()?;
        let mut articles = Vec::new();
        match sport {
            Some(sp) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTICLE_COLS} FROM articles WHERE hidden = 0 AND sport = ?1
                     ORDER BY featured DESC, display_order, published_at DESC"
                ))?;
                let rows = stmt.query_map(params![sp], map_article)?;
                for row in rows {
                    articles.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ARTICLE_COLS} FROM articles WHERE hidden = 0
                     ORDER BY featured DESC, display_order, published_at DESC"
                ))?;
                let rows = stmt.query_map([], map_article)?;
                for row in rows {
                    articles.push(row?);
                }
            }
        }
        Ok(articles)
    }

    pub fn list_all_articles(&self) -> Result<Vec<ArticleRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {ARTICLE_COLS} FROM articles ORDER BY published_at DESC"
        ))?;
        let rows = stmt.query_map([], map_article)?;
        let mut articles = Vec::new();
        for row in rows {
            articles.push(row?);
        }
        Ok(articles)
    }

    /// Re-sync the published copy from its draft (the update-published flow).
    pub fn sync_article_from_draft(
        &self,
        article_id: &str,
        title: &str,
        standfirst: &str,
        content: &str,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE articles SET title = ?1, standfirst = ?2, content = ?3 WHERE id = ?4",
            params![title, standfirst, content, article_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("article"));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update_article_fields(
        &self,
        id: &str,
        byline: Option<&str>,
        image_url: Option<&str>,
        context_label: Option<&str>,
        sport: Option<&str>,
        hidden: Option<bool>,
        featured: Option<bool>,
        display_order: Option<i64>,
        scheduled_at: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE articles SET
                byline = COALESCE(?1, byline),
                image_url = COALESCE(?2, image_url),
                context_label = COALESCE(?3, context_label),
                sport = COALESCE(?4, sport),
                hidden = COALESCE(?5, hidden),
                featured = COALESCE(?6, featured),
                display_order = COALESCE(?7, display_order),
                scheduled_at = COALESCE(?8, scheduled_at)
             WHERE id = ?9",
            params![
                byline,
                image_url,
                context_label,
                sport,
                hidden.map(i64::from),
                featured.map(i64::from),
                display_order,
                scheduled_at,
                id
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("article"));
        }
        Ok(())
    }

    pub fn update_article_seo_fields(
        &self,
        id: &str,
        meta_description: Option<&str>,
        canonical_url: Option<&str>,
        noindex: Option<bool>,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE articles SET
                meta_description = COALESCE(?1, meta_description),
                canonical_url = COALESCE(?2, canonical_url),
                noindex = COALESCE(?3, noindex)
             WHERE id = ?4",
            params![meta_description, canonical_url, noindex.map(i64::from), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("article"));
        }
        Ok(())
    }

    pub fn record_seo_audit(
        &self,
        id: &str,
        status: SeoAuditStatus,
        notes: &str,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE articles SET seo_status = ?1, seo_notes = ?2, seo_reviewed_at = ?3
             WHERE id = ?4",
            params![status.as_str(), notes, now_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("article"));
        }
        Ok(())
    }
}
