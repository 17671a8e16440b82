use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{ContentStore, now_rfc3339};
use crate::error::{Error, Result};
use crate::store::types::PageViewRecord;

impl ContentStore {
    /// Append a page-view event. Rejects unknown article ids with `NotFound`
    /// so beacon spam against invented ids writes nothing.
    pub fn insert_page_view(
        &self,
        article_id: &str,
        session_id: Option<&str>,
        duration_secs: Option<i64>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE id = ?1",
            params![article_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(Error::NotFound("article"));
        }

        conn.execute(
            "INSERT INTO page_views (article_id, session_id, duration_secs, user_agent, referrer, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![article_id, session_id, duration_secs, user_agent, referrer, now_rfc3339()],
        )?;
        Ok(())
    }

    /// All events at or after `since`, oldest first. RFC 3339 UTC strings
    /// compare lexicographically, so the range filter runs in SQL.
    pub fn page_views_since(&self, since: DateTime<Utc>) -> Result<Vec<PageViewRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, article_id, session_id, duration_secs, user_agent, referrer, created_at
             FROM page_views WHERE created_at >= ?1 ORDER BY created_at",
        )?;
        let rows = stmt.query_map(params![since.to_rfc3339()], |row| {
            let created_raw: String = row.get(6)?;
            Ok(PageViewRecord {
                id: row.get(0)?,
                article_id: row.get(1)?,
                session_id: row.get(2)?,
                duration_secs: row.get(3)?,
                user_agent: row.get(4)?,
                referrer: row.get(5)?,
                created_at: DateTime::parse_from_rfc3339(&created_raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;
        let mut views = Vec::new();
        for row in rows {
            views.push(row?);
        }
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::articles::NewArticle;
    use crate::store::drafts::DraftCreation;
    use crate::store::pitches::NewPitch;

    fn store_with_article() -> (ContentStore, String) {
        let store = ContentStore::open_in_memory().unwrap();
        let agent = store.create_agent("A", "golf", "", 3, None).unwrap();
        let pitch = store
            .insert_pitch(&NewPitch {
                agent_id: &agent.id,
                title: "t",
                standfirst: "s",
                angle: "a",
                why_now: None,
                context_label: None,
                estimated_minutes: None,
            })
            .unwrap();
        let draft = match store.create_draft_approving_pitch(&pitch.id, "x").unwrap() {
            DraftCreation::Created(d) => d,
            _ => unreachable!(),
        };
        let article = store
            .publish_article(&NewArticle {
                draft_id: &draft.id,
                slug: "t",
                title: "t",
                standfirst: "s",
                content: "x",
                context_label: None,
                byline: None,
                reading_minutes: None,
                featured: false,
                sport: None,
            })
            .unwrap();
        (store, article.id)
    }

    #[test]
    fn unknown_article_writes_no_row() {
        let (store, _) = store_with_article();
        let err = store
            .insert_page_view("ghost", None, None, None, None)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let views = store
            .page_views_since(Utc::now() - chrono::Duration::days(1))
            .unwrap();
        assert!(views.is_empty());
    }

    #[test]
    fn views_outside_the_window_are_excluded() {
        let (store, article_id) = store_with_article();
        store
            .insert_page_view(&article_id, Some("s1"), Some(40), None, None)
            .unwrap();

        let recent = store
            .page_views_since(Utc::now() - chrono::Duration::minutes(5))
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].duration_secs, Some(40));

        let future = store
            .page_views_since(Utc::now() + chrono::Duration::minutes(5))
            .unwrap();
        assert!(future.is_empty());
    }
}
