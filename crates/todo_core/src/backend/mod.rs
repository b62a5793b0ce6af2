//! Persistence capabilities consumed by the todo store.
//!
//! # Responsibility
//! - Define the `StoreBackend` contract (`load`/`save` of a whole snapshot).
//! - Define the lower-level `KeyValueStore` contract (`get`/`put`/`delete`).
//! - Provide file, SQLite and in-memory media.
//!
//! # Invariants
//! - `save` is all-or-nothing: a later `load` sees the old or the new
//!   document, never a mix.
//! - Absent data loads as an empty snapshot.
//! - Undecodable data loads as an empty snapshot and is logged, not raised.

use crate::model::todo::StoreSnapshot;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod document;
pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use document::{DocumentBackend, DEFAULT_DOCUMENT_KEY};
pub use json_file::JsonFileBackend;
pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

pub type BackendResult<T> = Result<T, BackendError>;

/// Transport-level failure of a persistence medium.
#[derive(Debug)]
pub enum BackendError {
    Io(std::io::Error),
    Sqlite(rusqlite::Error),
    /// The `kv` database was written by a newer build.
    UnsupportedSchema {
        db_version: u32,
        latest_supported: u32,
    },
    /// The `kv` table exists but lacks a column the store reads or writes.
    MissingKvColumn(&'static str),
    Encode(serde_json::Error),
}

impl BackendError {
    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io_failed",
            Self::Sqlite(_) => "sqlite_failed",
            Self::UnsupportedSchema { .. } => "kv_schema_unsupported",
            Self::MissingKvColumn(_) => "kv_schema_incomplete",
            Self::Encode(_) => "encode_failed",
        }
    }
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "storage i/o failed: {err}"),
            Self::Sqlite(err) => write!(f, "storage database failed: {err}"),
            Self::UnsupportedSchema {
                db_version,
                latest_supported,
            } => write!(
                f,
                "kv schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MissingKvColumn(column) => {
                write!(f, "kv table is missing required column `{column}`")
            }
            Self::Encode(err) => write!(f, "failed to encode store document: {err}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::UnsupportedSchema { .. } | Self::MissingKvColumn(_) => None,
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Whole-snapshot persistence used by `TodoStore`.
pub trait StoreBackend: Send + Sync {
    /// Returns the last saved snapshot, or an empty one.
    fn load(&self) -> BackendResult<StoreSnapshot>;
    /// Durably replaces the persisted snapshot.
    fn save(&self, snapshot: &StoreSnapshot) -> BackendResult<()>;
}

impl<B: StoreBackend + ?Sized> StoreBackend for Arc<B> {
    fn load(&self) -> BackendResult<StoreSnapshot> {
        (**self).load()
    }

    fn save(&self, snapshot: &StoreSnapshot) -> BackendResult<()> {
        (**self).save(snapshot)
    }
}

/// Durable string key-value capability.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> BackendResult<Option<String>>;
    /// Overwrites `key` atomically.
    fn put(&self, key: &str, value: &str) -> BackendResult<()>;
    /// Removes `key`; absent keys are not an error.
    fn delete(&self, key: &str) -> BackendResult<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Arc<K> {
    fn get(&self, key: &str) -> BackendResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> BackendResult<()> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> BackendResult<()> {
        (**self).delete(key)
    }
}

/// Decodes a persisted document, degrading to empty on malformed content.
///
/// `source` only feeds the log line (`file`, `kv:<key>`, ...).
pub(crate) fn decode_snapshot(raw: &str, source: &str) -> StoreSnapshot {
    if raw.trim().is_empty() {
        return StoreSnapshot::empty();
    }

    match serde_json::from_str::<StoreSnapshot>(raw) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(
                "event=backend_load module=backend status=degraded source={} bytes={} error_code=malformed_document error={}",
                source,
                raw.len(),
                err
            );
            StoreSnapshot::empty()
        }
    }
}

pub(crate) fn encode_snapshot(snapshot: &StoreSnapshot) -> BackendResult<String> {
    serde_json::to_string(snapshot).map_err(BackendError::Encode)
}

#[cfg(test)]
mod tests {
    use super::{decode_snapshot, encode_snapshot};
    use crate::model::todo::{StoreSnapshot, TodoItem, TodoList};

    #[test]
    fn decode_treats_blank_and_garbage_as_empty() {
        assert!(decode_snapshot("", "test").is_empty());
        assert!(decode_snapshot("  \n", "test").is_empty());
        assert!(decode_snapshot("{not json", "test").is_empty());
        assert!(decode_snapshot(r#"{"name":"not an array"}"#, "test").is_empty());
    }

    #[test]
    fn encode_then_decode_preserves_order_and_fields() {
        let mut work = TodoList::new("Work");
        work.todos.push(TodoItem::new(2_i64).with_field("title", "second"));
        work.todos.push(TodoItem::new(1_i64).with_field("done", true));
        let snapshot = StoreSnapshot::from_lists(vec![work, TodoList::new("Home")]);

        let raw = encode_snapshot(&snapshot).unwrap();
        assert_eq!(decode_snapshot(&raw, "test"), snapshot);
    }
}
