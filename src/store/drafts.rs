use rusqlite::{Row, params};

use super::{ContentStore, is_unique_violation, now_rfc3339};
use crate::error::{Error, Result};
use crate::store::types::{DraftRecord, DraftStatus, PitchStatus};

const DRAFT_COLS: &str =
    "id, pitch_id, title, standfirst, content, status, editor_notes, created_at, updated_at";

fn map_draft(row: &Row) -> rusqlite::Result<DraftRecord> {
    let status_str: String = row.get(5)?;
    Ok(DraftRecord {
        id: row.get(0)?,
        pitch_id: row.get(1)?,
        title: row.get(2)?,
        standfirst: row.get(3)?,
        content: row.get(4)?,
        status: DraftStatus::parse(&status_str).unwrap_or(DraftStatus::Draft),
        editor_notes: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Result of the approve-pitch write: either this call created the draft, or
/// a draft already existed (including losing a same-pitch approve race).
pub enum DraftCreation {
    Created(DraftRecord),
    AlreadyExists(DraftRecord),
}

impl ContentStore {
    /// Create the draft for an approved pitch and flip the pitch status, as
    /// one transaction. A crash can never leave an approved pitch with no
    /// draft or a draft on a non-approved pitch.
    ///
    /// A concurrent approve is resolved by the UNIQUE(pitch_id) constraint:
    /// the loser sees the violation, ensures pitch status consistency, and
    /// returns the winner's draft.
    pub fn create_draft_approving_pitch(
        &self,
        pitch_id: &str,
        content: &str,
    ) -> Result<DraftCreation> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_rfc3339();

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let inserted = tx.execute(
            "INSERT INTO drafts (id, pitch_id, content, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![id, pitch_id, content, DraftStatus::Draft.as_str(), now],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                drop(tx);
                drop(conn);
                self.set_pitch_status(pitch_id, PitchStatus::Approved, None)?;
                let existing = self
                    .get_draft_by_pitch(pitch_id)?
                    .ok_or(Error::NotFound("draft"))?;
                return Ok(DraftCreation::AlreadyExists(existing));
            }
            Err(e) => return Err(e.into()),
        }

        let updated = tx.execute(
            "UPDATE pitches SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![PitchStatus::Approved.as_str(), now, pitch_id],
        )?;
        if updated == 0 {
            // Rolls the draft insert back with it.
            return Err(Error::NotFound("pitch"));
        }

        tx.commit()?;
        drop(conn);

        tracing::info!("pitch {} approved, draft {} created", pitch_id, id);
        let draft = self.get_draft(&id)?.ok_or(Error::NotFound("draft"))?;
        Ok(DraftCreation::Created(draft))
    }

    pub fn get_draft(&self, id: &str) -> Result<Option<DraftRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {DRAFT_COLS} FROM drafts WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], map_draft)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn get_draft_by_pitch(&self, pitch_id: &str) -> Result<Option<DraftRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {DRAFT_COLS} FROM drafts WHERE pitch_id = ?1"))?;
        let mut rows = stmt.query_map(params![pitch_id], map_draft)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn list_drafts(&self, status: Option<DraftStatus>) -> Result<Vec<DraftRecord>> {
        let conn = self.conn()?;
        let mut drafts = Vec::new();
        match status {
            Some(st) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {DRAFT_COLS} FROM drafts WHERE status = ?1 ORDER BY updated_at DESC"
                ))?;
                let rows = stmt.query_map(params![st.as_str()], map_draft)?;
                for row in rows {
                    drafts.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {DRAFT_COLS} FROM drafts ORDER BY updated_at DESC"
                ))?;
                let rows = stmt.query_map([], map_draft)?;
                for row in rows {
                    drafts.push(row?);
                }
            }
        }
        Ok(drafts)
    }

    pub fn update_draft_fields(
        &self,
        id: &str,
        title: Option<&str>,
        standfirst: Option<&str>,
        content: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE drafts SET
                title = COALESCE(?1, title),
                standfirst = COALESCE(?2, standfirst),
                content = COALESCE(?3, content),
                updated_at = ?4
             WHERE id = ?5",
            params![title, standfirst, content, now_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("draft"));
        }
        Ok(())
    }

    pub fn set_draft_status(
        &self,
        id: &str,
        status: DraftStatus,
        editor_notes: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE drafts SET status = ?1,
                editor_notes = COALESCE(?2, editor_notes),
                updated_at = ?3
             WHERE id = ?4",
            params![status.as_str(), editor_notes, now_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("draft"));
        }
        Ok(())
    }

    /// Overwrite content and force a status in one statement, used by the
    /// article upgrade path to push revised copy back into review.
    pub fn replace_draft_content(
        &self,
        id: &str,
        content: &str,
        status: DraftStatus,
        editor_notes: &str,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE drafts SET content = ?1, status = ?2, editor_notes = ?3, updated_at = ?4
             WHERE id = ?5",
            params![content, status.as_str(), editor_notes, now_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("draft"));
        }
        Ok(())
    }

    pub fn clear_draft_notes(&self, id: &str) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE drafts SET editor_notes = NULL, updated_at = ?1 WHERE id = ?2",
            params![now_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("draft"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::pitches::NewPitch;

    fn store_with_pitch() -> (ContentStore, String) {
        let store = ContentStore::open_in_memory().unwrap();
        let agent = store.create_agent("A", "cycling", "", 3, None).unwrap();
        let pitch = store
            .insert_pitch(&NewPitch {
                agent_id: &agent.id,
                title: "The breakaway",
                standfirst: "s",
                angle: "a",
                why_now: None,
                context_label: None,
                estimated_minutes: None,
            })
            .unwrap();
        (store, pitch.id)
    }

    #[test]
    fn approve_creates_draft_and_flips_pitch_atomically() {
        let (store, pitch_id) = store_with_pitch();
        let created = store
            .create_draft_approving_pitch(&pitch_id, "<p>body</p>")
            .unwrap();
        let draft = match created {
            DraftCreation::Created(d) => d,
            DraftCreation::AlreadyExists(_) => panic!("first approve must create"),
        };
        assert_eq!(draft.status, DraftStatus::Draft);

        let pitch = store.get_pitch(&pitch_id).unwrap().unwrap();
        assert_eq!(pitch.status, PitchStatus::Approved);
    }

    #[test]
    fn second_approve_never_creates_a_second_draft() {
        let (store, pitch_id) = store_with_pitch();
        let first = match store
            .create_draft_approving_pitch(&pitch_id, "<p>one</p>")
            .unwrap()
        {
            DraftCreation::Created(d) => d,
            _ => panic!("expected creation"),
        };

        match store
            .create_draft_approving_pitch(&pitch_id, "<p>two</p>")
            .unwrap()
        {
            DraftCreation::AlreadyExists(d) => {
                assert_eq!(d.id, first.id);
                assert_eq!(d.content, "<p>one</p>");
            }
            DraftCreation::Created(_) => panic!("race must resolve to the first draft"),
        }
    }

    #[test]
    fn approving_missing_pitch_rolls_back_draft_insert() {
        let (store, _) = store_with_pitch();
        // Foreign key on pitch_id rejects the insert outright.
        assert!(store.create_draft_approving_pitch("ghost", "x").is_err());
        assert!(store.get_draft_by_pitch("ghost").unwrap().is_none());
    }

    #[test]
    fn clear_notes_leaves_content_alone() {
        let (store, pitch_id) = store_with_pitch();
        let draft = match store.create_draft_approving_pitch(&pitch_id, "body").unwrap() {
            DraftCreation::Created(d) => d,
            _ => unreachable!(),
        };
        store
            .set_draft_status(&draft.id, DraftStatus::Submitted, Some("todo: tighten intro"))
            .unwrap();
        store.clear_draft_notes(&draft.id).unwrap();

        let got = store.get_draft(&draft.id).unwrap().unwrap();
        assert!(got.editor_notes.is_none());
        assert_eq!(got.content, "body");
    }
}
