//! SQLite bootstrap for the key-value backend.
//!
//! # Responsibility
//! - Open and configure SQLite connections used by `SqliteKeyValueStore`.
//! - Bring the `kv` table up to the layout this build reads and writes.
//!
//! # Invariants
//! - The `kv` layout version is tracked via `PRAGMA user_version`.
//! - No key is read or written before `ensure_kv_schema` succeeds.

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{ensure_kv_schema, kv_schema_version, latest_kv_schema_version};
