// src/memory/sqlite.rs — SQLite-backed key-value store

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::kv::KeyValueStore;
use super::schema;
use crate::infra::errors::AuditorError;

pub struct SqliteKv {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKv {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self, AuditorError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        schema::run_migrations(&conn)?;
        tracing::debug!(path = %path.display(), "Opened session database");
        Ok(Self::from_connection(conn))
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, AuditorError> {
        let conn = Connection::open_in_memory()?;
        schema::run_migrations(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, AuditorError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| AuditorError::Persistence("SQLite connection lock poisoned".into()))?;
            f(&guard).map_err(AuditorError::from)
        })
        .await
        .map_err(|e| AuditorError::Persistence(format!("SQLite task failed: {e}")))?
    }
}

#[async_trait]
impl KeyValueStore for SqliteKv {
    async fn get(&self, key: &str) -> Result<Option<String>, AuditorError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |r| {
                r.get(0)
            })
            .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AuditorError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value],
            )
            .map(|_| ())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), AuditorError> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
                .map(|_| ())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_roundtrip() {
        let kv = SqliteKv::in_memory().unwrap();
        assert_eq!(kv.get("x").await.unwrap(), None);
        kv.set("x", "first").await.unwrap();
        kv.set("x", "second").await.unwrap();
        assert_eq!(kv.get("x").await.unwrap(), Some("second".into()));
        kv.remove("x").await.unwrap();
        assert_eq!(kv.get("x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("kv.db");
        {
            let kv = SqliteKv::open(&path).unwrap();
            kv.set("@ego_auditor_disclaimer", "true").await.unwrap();
        }
        let kv = SqliteKv::open(&path).unwrap();
        assert_eq!(
            kv.get("@ego_auditor_disclaimer").await.unwrap(),
            Some("true".into())
        );
    }
}
