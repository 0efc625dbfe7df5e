//! SQLite-based store implementation

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{KvStore, StoreError, StoreResult};

/// SQLite-based key-value store, one database file per installation
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl SqliteKvStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn()?;

        let value: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |row| row.get(0))
            .optional()?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, dokan_util::now().to_rfc3339()],
        )?;

        debug!(key, bytes = value.len(), "Value stored");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
        debug!(key, "Value removed");
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}
