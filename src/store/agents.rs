use rusqlite::{Row, params};

use super::{ContentStore, now_rfc3339};
use crate::error::{Error, Result};
use crate::store::types::AgentRecord;

const AGENT_COLS: &str =
    "id, name, focus, constraints_text, active, pitch_limit, user_id, created_at, updated_at";

fn map_agent(row: &Row) -> rusqlite::Result<AgentRecord> {
    Ok(AgentRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        focus: row.get(2)?,
        constraints: row.get(3)?,
        active: row.get::<_, i64>(4)? != 0,
        pitch_limit: row.get(5)?,
        user_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl ContentStore {
    pub fn create_agent(
        &self,
        name: &str,
        focus: &str,
        constraints: &str,
        pitch_limit: i64,
        user_id: Option<&str>,
    ) -> Result<AgentRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_rfc3339();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO agents (id, name, focus, constraints_text, active, pitch_limit, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6, ?7, ?7)",
            params![id, name, focus, constraints, pitch_limit, user_id, now],
        )?;
        drop(conn);
        tracing::debug!("created agent {} ({})", name, id);
        self.get_agent(&id)?.ok_or(Error::NotFound("agent"))
    }

    pub fn get_agent(&self, id: &str) -> Result<Option<AgentRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {AGENT_COLS} FROM agents WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], map_agent)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn list_agents(&self, only_active: bool) -> Result<Vec<AgentRecord>> {
        let conn = self.conn()?;
        let sql = if only_active {
            format!("SELECT {AGENT_COLS} FROM agents WHERE active = 1 ORDER BY created_at")
        } else {
            format!("SELECT {AGENT_COLS} FROM agents ORDER BY created_at")
        };
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_agent)?;
        let mut agents = Vec::new();
        for row in rows {
            agents.push(row?);
        }
        Ok(agents)
    }

    pub fn update_agent(
        &self,
        id: &str,
        name: Option<&str>,
        focus: Option<&str>,
        constraints: Option<&str>,
        pitch_limit: Option<i64>,
        active: Option<bool>,
    ) -> Result<AgentRecord> {
        let now = now_rfc3339();
        {
            let conn = self.conn()?;
            let updated = conn.execute(
                "UPDATE agents SET
                    name = COALESCE(?1, name),
                    focus = COALESCE(?2, focus),
                    constraints_text = COALESCE(?3, constraints_text),
                    pitch_limit = COALESCE(?4, pitch_limit),
                    active = COALESCE(?5, active),
                    updated_at = ?6
                 WHERE id = ?7",
                params![name, focus, constraints, pitch_limit, active.map(i64::from), now, id],
            )?;
            if updated == 0 {
                return Err(Error::NotFound("agent"));
            }
        }
        self.get_agent(id)?.ok_or(Error::NotFound("agent"))
    }
}
