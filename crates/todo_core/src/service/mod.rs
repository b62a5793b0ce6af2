//! Store use-case services.
//!
//! # Responsibility
//! - Own the todo store state machine and its invariants.
//! - Serialize every read-modify-write against the backend.
//!
//! # See also
//! - `crate::request` for the transport-agnostic request boundary.

pub mod todo_store;
