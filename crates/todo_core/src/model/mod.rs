//! Domain model for the todo list store.
//!
//! # Responsibility
//! - Define the aggregate (`StoreSnapshot`) and its members (`TodoList`,
//!   `TodoItem`).
//! - Own structural validation shared by write paths and load paths.
//!
//! # Invariants
//! - List names are unique across one snapshot.
//! - Item ids are unique within one list.
//! - Sequences are ordered newest first; order is the recency signal.

pub mod todo;
