//! SQLite-backed key-value medium.
//!
//! # Responsibility
//! - Map `get`/`put`/`delete` onto the `kv` table.
//!
//! # Invariants
//! - Every `put` is one upsert statement, so a crash leaves either the old
//!   or the new value.
//! - The connection is only touched under the internal mutex.

use super::{BackendResult, KeyValueStore};
use crate::db::{ensure_kv_schema, open_db, open_db_in_memory};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// `KeyValueStore` over one SQLite connection.
pub struct SqliteKeyValueStore {
    conn: Mutex<Connection>,
}

impl SqliteKeyValueStore {
    /// Opens or creates the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> BackendResult<Self> {
        Ok(Self::with_migrated(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> BackendResult<Self> {
        Ok(Self::with_migrated(open_db_in_memory()?))
    }

    /// Wraps a caller-provided connection after checking its `kv` layout.
    ///
    /// # Errors
    /// - `UnsupportedSchema` when the database comes from a newer build.
    /// - `MissingKvColumn` when an existing `kv` table has another shape.
    pub fn from_connection(mut conn: Connection) -> BackendResult<Self> {
        ensure_kv_schema(&mut conn)?;
        Ok(Self::with_migrated(conn))
    }

    fn with_migrated(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> BackendResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> BackendResult<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM kv WHERE key = ?1;", [key])?;
        Ok(())
    }
}
