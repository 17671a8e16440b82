use rusqlite::params;

use super::ContentStore;
use crate::error::{Error, Result};
use crate::store::types::ArticleRecord;

impl ContentStore {
    /// Create a symmetric "related reading" link. Both directed rows go in
    /// one transaction so a partial failure never leaves a one-way edge.
    pub fn relate_articles(&self, from_id: &str, to_id: &str) -> Result<()> {
        if from_id == to_id {
            return Err(Error::Validation(
                "an article cannot relate to itself".to_string(),
            ));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO article_relations (from_article_id, to_article_id) VALUES (?1, ?2)",
            params![from_id, to_id],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO article_relations (from_article_id, to_article_id) VALUES (?1, ?2)",
            params![to_id, from_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn unrelate_articles(&self, from_id: &str, to_id: &str) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM article_relations WHERE from_article_id = ?1 AND to_article_id = ?2",
            params![from_id, to_id],
        )?;
        tx.execute(
            "DELETE FROM article_relations WHERE from_article_id = ?1 AND to_article_id = ?2",
            params![to_id, from_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Related, publicly visible articles for a given article.
    pub fn related_articles(&self, article_id: &str) -> Result<Vec<ArticleRecord>> {
        let related_ids: Vec<String> = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(
                "SELECT to_article_id FROM article_relations WHERE from_article_id = ?1",
            )?;
            let rows = stmt.query_map(params![article_id], |row| row.get(0))?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row?);
            }
            ids
        };

        let mut related = Vec::new();
        for id in related_ids {
            if let Some(article) = self.get_article(&id)?
                && !article.hidden
            {
                related.push(article);
            }
        }
        Ok(related)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::articles::NewArticle;
    use crate::store::drafts::DraftCreation;
    use crate::store::pitches::NewPitch;

    fn publish_one(store: &ContentStore, slug: &str) -> ArticleRecord {
        let agent = store.create_agent(slug, "tennis", "", 9, None).unwrap();
        let pitch = store
            .insert_pitch(&NewPitch {
                agent_id: &agent.id,
                title: slug,
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
        store
            .publish_article(&NewArticle {
                draft_id: &draft.id,
                slug,
                title: slug,
                standfirst: "s",
                content: "x",
                context_label: None,
                byline: None,
                reading_minutes: None,
                featured: false,
                sport: None,
            })
            .unwrap()
    }

    #[test]
    fn relation_is_symmetric() {
        let store = ContentStore::open_in_memory().unwrap();
        let a = publish_one(&store, "a");
        let b = publish_one(&store, "b");

        store.relate_articles(&a.id, &b.id).unwrap();
        assert_eq!(store.related_articles(&a.id).unwrap()[0].id, b.id);
        assert_eq!(store.related_articles(&b.id).unwrap()[0].id, a.id);
    }

    #[test]
    fn self_relation_is_rejected() {
        let store = ContentStore::open_in_memory().unwrap();
        let a = publish_one(&store, "a");
        assert!(store.relate_articles(&a.id, &a.id).is_err());
    }

    #[test]
    fn unrelate_removes_both_directions() {
        let store = ContentStore::open_in_memory().unwrap();
        let a = publish_one(&store, "a");
        let b = publish_one(&store, "b");
        store.relate_articles(&a.id, &b.id).unwrap();
        store.unrelate_articles(&b.id, &a.id).unwrap();
        assert!(store.related_articles(&a.id).unwrap().is_empty());
        assert!(store.related_articles(&b.id).unwrap().is_empty());
    }

    #[test]
    fn hidden_articles_are_filtered_from_related() {
        let store = ContentStore::open_in_memory().unwrap();
        let a = publish_one(&store, "a");
        let b = publish_one(&store, "b");
        store.relate_articles(&a.id, &b.id).unwrap();
        store
            .update_article_fields(&b.id, None, None, None, None, Some(true), None, None, None)
            .unwrap();
        assert!(store.related_articles(&a.id).unwrap().is_empty());
    }
}
