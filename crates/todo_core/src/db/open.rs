//! Connection bootstrap for the SQLite key-value medium.
//!
//! # Invariants
//! - Returned connections have the current `kv` layout.
//! - File connections run in WAL mode so readers never see a torn write.

use super::schema::ensure_kv_schema;
use crate::backend::BackendResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) a SQLite file and brings `kv` up to date.
///
/// # Side effects
/// - Emits `db_open` events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> BackendResult<Connection> {
    open_with("file", || {
        let conn = Connection::open(path.as_ref())?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Ok(conn)
    })
}

/// Opens a private in-memory database with an empty `kv` table.
pub fn open_db_in_memory() -> BackendResult<Connection> {
    open_with("memory", || Ok(Connection::open_in_memory()?))
}

fn open_with(
    mode: &'static str,
    connect: impl FnOnce() -> BackendResult<Connection>,
) -> BackendResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let result = connect().and_then(|mut conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        ensure_kv_schema(&mut conn)?;
        Ok(conn)
    });

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error_code={} error={}",
            started_at.elapsed().as_millis(),
            err.code(),
            err
        ),
    }

    result
}
