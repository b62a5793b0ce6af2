//! Layout of the `kv` table.
//!
//! # Invariants
//! - Steps are ordered by version and never edited once released.
//! - Pending steps apply in one transaction together with the version bump.
//! - After `ensure_kv_schema`, `kv` has every column in `KV_COLUMNS`.

use crate::backend::{BackendError, BackendResult};
use log::info;
use rusqlite::Connection;

const KV_SCHEMA_STEPS: &[(u32, &str)] = &[(1, include_str!("kv_v1.sql"))];

const KV_COLUMNS: &[&str] = &["key", "value", "updated_at"];

/// Highest `kv` layout version this build understands.
pub fn latest_kv_schema_version() -> u32 {
    KV_SCHEMA_STEPS.last().map_or(0, |(version, _)| *version)
}

/// Reads the `kv` layout version recorded in `PRAGMA user_version`.
pub fn kv_schema_version(conn: &Connection) -> BackendResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

/// Applies pending layout steps, then checks the `kv` columns.
///
/// # Errors
/// - `UnsupportedSchema` when the file was written by a newer build.
/// - `MissingKvColumn` when `kv` was created by something else.
pub fn ensure_kv_schema(conn: &mut Connection) -> BackendResult<()> {
    let found = kv_schema_version(conn)?;
    let latest = latest_kv_schema_version();
    if found > latest {
        return Err(BackendError::UnsupportedSchema {
            db_version: found,
            latest_supported: latest,
        });
    }

    if found < latest {
        let tx = conn.transaction()?;
        for (version, sql) in KV_SCHEMA_STEPS.iter().filter(|(v, _)| *v > found) {
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", *version)?;
        }
        tx.commit()?;
        info!("event=kv_schema module=db status=upgraded from={found} to={latest}");
    }

    check_kv_columns(conn)
}

fn check_kv_columns(conn: &Connection) -> BackendResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('kv');")?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    match KV_COLUMNS
        .iter()
        .copied()
        .find(|column| !present.iter().any(|name| name.as_str() == *column))
    {
        Some(column) => Err(BackendError::MissingKvColumn(column)),
        None => Ok(()),
    }
}
