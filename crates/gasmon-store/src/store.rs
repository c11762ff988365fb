//! Main store implementation.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::schema;

/// SQLite-based key-value store for gasmon data tiers.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("path", &self.path).finish()
    }
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Location of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// List stored keys with their last-modified time.
    pub fn list_keys(&self) -> Result<Vec<(String, OffsetDateTime)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, updated_at FROM kv ORDER BY key")?;

        let rows = stmt
            .query_map([], |row| {
                let key: String = row.get(0)?;
                let updated_at: i64 = row.get(1)?;
                Ok((key, updated_at))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(key, ts)| {
                let updated = OffsetDateTime::from_unix_timestamp(ts)
                    .unwrap_or(OffsetDateTime::UNIX_EPOCH);
                (key, updated)
            })
            .collect())
    }
}

impl KeyValueStore for Store {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            rusqlite::params![key, value, now],
        )?;
        debug!("Stored {} bytes under '{}'", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
        debug!("Removed '{}' ({} row(s))", key, removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.list_keys().unwrap().is_empty());
        assert!(store.path().is_none());
    }

    #[test]
    fn test_set_and_get() {
        let store = Store::open_in_memory().unwrap();
        store.set("data_history", "[]").unwrap();
        assert_eq!(store.get("data_history").unwrap().as_deref(), Some("[]"));
        assert!(store.get("monthly_data").unwrap().is_none());
    }

    #[test]
    fn test_set_replaces_value() {
        let store = Store::open_in_memory().unwrap();
        store.set("todays_data", "[1]").unwrap();
        store.set("todays_data", "[1,2]").unwrap();

        assert_eq!(store.get("todays_data").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(store.list_keys().unwrap().len(), 1);
    }

    #[test]
    fn test_remove() {
        let store = Store::open_in_memory().unwrap();
        store.set("todays_data", "[]").unwrap();
        store.remove("todays_data").unwrap();
        store.remove("todays_data").unwrap();
        assert!(store.get("todays_data").unwrap().is_none());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.db");

        {
            let store = Store::open(&path).unwrap();
            store.set("monthly_data", r#"[{"month":"2025-01"}]"#).unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));
        assert_eq!(
            store.get("monthly_data").unwrap().as_deref(),
            Some(r#"[{"month":"2025-01"}]"#)
        );
    }
}
