use rusqlite::{Row, params};

use super::{ContentStore, now_rfc3339};
use crate::error::{Error, Result};
use crate::store::types::{PitchRecord, PitchStatus};

const PITCH_COLS: &str = "id, agent_id, title, standfirst, angle, why_now, context_label, \
     estimated_minutes, status, editor_notes, research_json, created_at, updated_at";

fn map_pitch(row: &Row) -> rusqlite::Result<PitchRecord> {
    let status_str: String = row.get(8)?;
    Ok(PitchRecord {
        id: row.get(0)?,
        agent_id: row.get(1)?,
        title: row.get(2)?,
        standfirst: row.get(3)?,
        angle: row.get(4)?,
        why_now: row.get(5)?,
        context_label: row.get(6)?,
        estimated_minutes: row.get(7)?,
        status: PitchStatus::parse(&status_str).unwrap_or(PitchStatus::Submitted),
        editor_notes: row.get(9)?,
        research_json: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

pub struct NewPitch<'a> {
    pub agent_id: &'a str,
    pub title: &'a str,
    pub standfirst: &'a str,
    pub angle: &'a str,
    pub why_now: Option<&'a str>,
    pub context_label: Option<&'a str>,
    pub estimated_minutes: Option<i64>,
}

impl ContentStore {
    pub fn insert_pitch(&self, pitch: &NewPitch) -> Result<PitchRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_rfc3339();
        {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO pitches (id, agent_id, title, standfirst, angle, why_now,
                     context_label, estimated_minutes, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                params![
                    id,
                    pitch.agent_id,
                    pitch.title,
                    pitch.standfirst,
                    pitch.angle,
                    pitch.why_now,
                    pitch.context_label,
                    pitch.estimated_minutes,
                    PitchStatus::Submitted.as_str(),
                    now,
                ],
            )?;
        }
        tracing::debug!("inserted pitch {}", id);
        self.get_pitch(&id)?.ok_or(Error::NotFound("pitch"))
    }

    pub fn get_pitch(&self, id: &str) -> Result<Option<PitchRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {PITCH_COLS} FROM pitches WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], map_pitch)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn list_pitches(&self, agent_id: Option<&str>) -> Result<Vec<PitchRecord>> {
        let conn = self.conn()?;
        let mut pitches = Vec::new();
        match agent_id {
            Some(aid) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PITCH_COLS} FROM pitches WHERE agent_id = ?1 ORDER BY created_at DESC"
                ))?;
                let rows = stmt.query_map(params![aid], map_pitch)?;
                for row in rows {
                    pitches.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PITCH_COLS} FROM pitches ORDER BY created_at DESC"
                ))?;
                let rows = stmt.query_map([], map_pitch)?;
                for row in rows {
                    pitches.push(row?);
                }
            }
        }
        Ok(pitches)
    }

    /// Pitches counting against the agent's limit: submitted or in review.
    pub fn count_open_pitches(&self, agent_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM pitches WHERE agent_id = ?1 AND status IN ('submitted', 'in_review')",
            params![agent_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn set_pitch_status(
        &self,
        id: &str,
        status: PitchStatus,
        editor_notes: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE pitches SET status = ?1,
                editor_notes = COALESCE(?2, editor_notes),
                updated_at = ?3
             WHERE id = ?4",
            params![status.as_str(), editor_notes, now_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("pitch"));
        }
        Ok(())
    }

    pub fn update_pitch_fields(
        &self,
        id: &str,
        title: Option<&str>,
        standfirst: Option<&str>,
        angle: Option<&str>,
        why_now: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE pitches SET
                title = COALESCE(?1, title),
                standfirst = COALESCE(?2, standfirst),
                angle = COALESCE(?3, angle),
                why_now = COALESCE(?4, why_now),
                updated_at = ?5
             WHERE id = ?6",
            params![title, standfirst, angle, why_now, now_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("pitch"));
        }
        Ok(())
    }

    pub fn set_pitch_research(&self, id: &str, research_json: &str) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE pitches SET research_json = ?1, updated_at = ?2 WHERE id = ?3",
            params![research_json, now_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("pitch"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_agent() -> (ContentStore, String) {
        let store = ContentStore::open_in_memory().unwrap();
        let agent = store.create_agent("A", "sprinting", "", 3, None).unwrap();
        (store, agent.id)
    }

    fn sample<'a>(agent_id: &'a str, title: &'a str) -> NewPitch<'a> {
        NewPitch {
            agent_id,
            title,
            standfirst: "A summary",
            angle: "An argument",
            why_now: None,
            context_label: None,
            estimated_minutes: Some(6),
        }
    }

    #[test]
    fn insert_starts_submitted() {
        let (store, agent_id) = store_with_agent();
        let pitch = store.insert_pitch(&sample(&agent_id, "The kick")).unwrap();
        assert_eq!(pitch.status, PitchStatus::Submitted);
        assert!(pitch.research_json.is_none());
    }

    #[test]
    fn open_pitch_count_tracks_submitted_and_in_review_only() {
        let (store, agent_id) = store_with_agent();
        let a = store.insert_pitch(&sample(&agent_id, "One")).unwrap();
        let b = store.insert_pitch(&sample(&agent_id, "Two")).unwrap();
        store.insert_pitch(&sample(&agent_id, "Three")).unwrap();

        store
            .set_pitch_status(&a.id, PitchStatus::Rejected, Some("pass"))
            .unwrap();
        store
            .set_pitch_status(&b.id, PitchStatus::InReview, None)
            .unwrap();

        assert_eq!(store.count_open_pitches(&agent_id).unwrap(), 2);
    }

    #[test]
    fn research_lives_in_its_own_column() {
        let (store, agent_id) = store_with_agent();
        let pitch = store.insert_pitch(&sample(&agent_id, "Anchors")).unwrap();
        store
            .set_pitch_research(&pitch.id, r#"{"version":1,"anchors":[]}"#)
            .unwrap();

        let got = store.get_pitch(&pitch.id).unwrap().unwrap();
        assert_eq!(got.research_json.as_deref(), Some(r#"{"version":1,"anchors":[]}"#));
        assert!(got.editor_notes.is_none());
    }

    #[test]
    fn status_update_on_missing_pitch_is_not_found() {
        let (store, _) = store_with_agent();
        let err = store
            .set_pitch_status("missing", PitchStatus::Approved, None)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
