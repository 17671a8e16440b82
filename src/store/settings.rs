use rusqlite::params;

use super::ContentStore;
use crate::error::Result;
use crate::store::types::SettingsRecord;

impl ContentStore {
    /// The singleton settings row; defaults are returned (not written) when
    /// no row exists yet.
    pub fn get_settings(&self) -> Result<SettingsRecord> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT cron_enabled, max_pitches_per_run FROM settings WHERE id = 1")?;
        let mut rows = stmt.query_map([], |row| {
            Ok(SettingsRecord {
                cron_enabled: row.get::<_, i64>(0)? != 0,
                max_pitches_per_run: row.get(1)?,
            })
        })?;
        match rows.next() {
            Some(row) => Ok(row?),
            None => Ok(SettingsRecord::default()),
        }
    }

    pub fn update_settings(
        &self,
        cron_enabled: Option<bool>,
        max_pitches_per_run: Option<i64>,
    ) -> Result<SettingsRecord> {
        let current = self.get_settings()?;
        let next = SettingsRecord {
            cron_enabled: cron_enabled.unwrap_or(current.cron_enabled),
            max_pitches_per_run: max_pitches_per_run.unwrap_or(current.max_pitches_per_run),
        };

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO settings (id, cron_enabled, max_pitches_per_run) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET cron_enabled = ?1, max_pitches_per_run = ?2",
            params![next.cron_enabled as i64, next.max_pitches_per_run],
        )?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_before_any_write() {
        let store = ContentStore::open_in_memory().unwrap();
        let settings = store.get_settings().unwrap();
        assert!(settings.cron_enabled);
        assert_eq!(settings.max_pitches_per_run, 1);
    }

    #[test]
    fn upsert_keeps_a_single_row() {
        let store = ContentStore::open_in_memory().unwrap();
        store.update_settings(Some(false), None).unwrap();
        store.update_settings(None, Some(4)).unwrap();

        let settings = store.get_settings().unwrap();
        assert!(!settings.cron_enabled);
        assert_eq!(settings.max_pitches_per_run, 4);

        let conn = store.conn().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
