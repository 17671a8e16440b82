mod agents;
pub mod articles;
pub mod drafts;
mod pageviews;
pub mod pitches;
mod relations;
mod settings;
pub mod tokens;
pub mod types;

use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::{Error, Result};

/// SQLite-backed content store.
///
/// Connections come from a small r2d2 pool. Callers must not hold a checked-out
/// connection across a generative API call; slow upstream requests are exactly
/// how the pool runs dry.
#[derive(Clone)]
pub struct ContentStore {
    pool: Pool<SqliteConnectionManager>,
}

type Conn = PooledConnection<SqliteConnectionManager>;

impl ContentStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Validation(format!("cannot create data dir: {e}")))?;
        }

        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        });
        let pool = Pool::builder()
            .max_size(8)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .map_err(|e| Error::Validation(format!("cannot open database: {e}")))?;

        let store = Self { pool };
        store.create_tables()?;
        tracing::info!("content store ready");
        Ok(store)
    }

    /// In-memory store sharing one connection, for tests.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| Error::Validation(format!("cannot open database: {e}")))?;
        let store = Self { pool };
        store.create_tables()?;
        Ok(store)
    }

    pub(crate) fn conn(&self) -> Result<Conn> {
        Ok(self.pool.get()?)
    }

    fn create_tables(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS agents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                focus TEXT NOT NULL,
                constraints_text TEXT NOT NULL DEFAULT '',
                active INTEGER NOT NULL DEFAULT 1,
                pitch_limit INTEGER NOT NULL DEFAULT 3,
                user_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS pitches (
                id TEXT PRIMARY KEY,
                agent_id TEXT NOT NULL REFERENCES agents(id),
                title TEXT NOT NULL,
                standfirst TEXT NOT NULL,
                angle TEXT NOT NULL,
                why_now TEXT,
                context_label TEXT,
                estimated_minutes INTEGER,
                status TEXT NOT NULL,
                editor_notes TEXT,
                research_json TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS drafts (
                id TEXT PRIMARY KEY,
                pitch_id TEXT NOT NULL UNIQUE REFERENCES pitches(id),
                title TEXT,
                standfirst TEXT,
                content TEXT NOT NULL,
                status TEXT NOT NULL,
                editor_notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS articles (
                id TEXT PRIMARY KEY,
                draft_id TEXT NOT NULL UNIQUE REFERENCES drafts(id),
                slug TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                standfirst TEXT NOT NULL,
                content TEXT NOT NULL,
                context_label TEXT,
                byline TEXT,
                image_url TEXT,
                reading_minutes INTEGER,
                hidden INTEGER NOT NULL DEFAULT 0,
                featured INTEGER NOT NULL DEFAULT 0,
                display_order INTEGER NOT NULL DEFAULT 0,
                sport TEXT,
                published_at TEXT NOT NULL,
                scheduled_at TEXT,
                meta_description TEXT,
                canonical_url TEXT,
                noindex INTEGER NOT NULL DEFAULT 0,
                seo_status TEXT NOT NULL DEFAULT 'pending',
                seo_notes TEXT,
                seo_reviewed_at TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS article_relations (
                from_article_id TEXT NOT NULL REFERENCES articles(id),
                to_article_id TEXT NOT NULL REFERENCES articles(id),
                PRIMARY KEY (from_article_id, to_article_id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS page_views (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                article_id TEXT NOT NULL REFERENCES articles(id),
                session_id TEXT,
                duration_secs INTEGER,
                user_agent TEXT,
                referrer TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_page_views_created ON page_views(created_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_pitches_agent_status ON pitches(agent_id, status)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                cron_enabled INTEGER NOT NULL DEFAULT 1,
                max_pitches_per_run INTEGER NOT NULL DEFAULT 1
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS api_tokens (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                agent_id TEXT,
                token_hash TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// True when the error is a UNIQUE constraint violation, used to resolve
/// create races as "already exists".
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_creates_schema() {
        let store = ContentStore::open_in_memory().unwrap();
        let conn = store.conn().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                 ('agents','pitches','drafts','articles','article_relations','page_views','settings','api_tokens')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 8);
    }

    #[test]
    fn open_on_disk_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pressbox.db");
        let store = ContentStore::open(&path).unwrap();
        assert!(path.exists());
        drop(store);
    }
}
