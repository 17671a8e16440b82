use rusqlite::params;
use sha2::{Digest, Sha256};

use super::{ContentStore, now_rfc3339};
use crate::error::Result;
use crate::store::types::{ApiTokenRecord, Role};

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn generate_raw_token() -> String {
    let bytes: [u8; 16] = rand::random();
    format!("pbx_{}", hex::encode(bytes))
}

/// The identity behind a validated bearer token.
#[derive(Debug, Clone)]
pub struct TokenIdentity {
    pub role: Role,
    pub agent_id: Option<String>,
}

impl ContentStore {
    /// Mint a token. The raw value is returned exactly once; only its hash
    /// is stored.
    pub fn create_api_token(
        &self,
        name: &str,
        role: Role,
        agent_id: Option<&str>,
    ) -> Result<(String, ApiTokenRecord)> {
        let raw_token = generate_raw_token();
        let token_hash = hash_token(&raw_token);
        let id = uuid::Uuid::new_v4().to_string();
        let now = now_rfc3339();

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO api_tokens (id, name, role, agent_id, token_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, name, role.as_str(), agent_id, token_hash, now],
        )?;

        Ok((
            raw_token,
            ApiTokenRecord {
                id,
                name: name.to_string(),
                role,
                agent_id: agent_id.map(str::to_string),
                created_at: now,
            },
        ))
    }

    pub fn validate_api_token(&self, raw_token: &str) -> Result<Option<TokenIdentity>> {
        let token_hash = hash_token(raw_token);
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT role, agent_id FROM api_tokens WHERE token_hash = ?1")?;
        let mut rows = stmt.query_map(params![token_hash], |row| {
            let role_str: String = row.get(0)?;
            Ok((role_str, row.get::<_, Option<String>>(1)?))
        })?;
        match rows.next() {
            Some(row) => {
                let (role_str, agent_id) = row?;
                Ok(Some(TokenIdentity {
                    role: Role::parse(&role_str)?,
                    agent_id,
                }))
            }
            None => Ok(None),
        }
    }

    pub fn list_api_tokens(&self) -> Result<Vec<ApiTokenRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, role, agent_id, created_at FROM api_tokens ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            let role_str: String = row.get(2)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                role_str,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;
        let mut tokens = Vec::new();
        for row in rows {
            let (id, name, role_str, agent_id, created_at) = row?;
            tokens.push(ApiTokenRecord {
                id,
                name,
                role: Role::parse(&role_str)?,
                agent_id,
                created_at,
            });
        }
        Ok(tokens)
    }

    pub fn delete_api_token(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM api_tokens WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}
