//! Core domain logic for the todo list store.
//! This crate is the single source of truth for store invariants.

pub mod backend;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod request;
pub mod service;

pub use backend::{
    BackendError, BackendResult, DocumentBackend, JsonFileBackend, KeyValueStore,
    MemoryKeyValueStore, SqliteKeyValueStore, StoreBackend,
};
pub use config::{init_config, ConfigError, StoreConfig, DEFAULT_MAX_TODO_ITEMS};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::todo::{StoreSnapshot, TodoId, TodoItem, TodoList, TodoValidationError};
pub use request::{dispatch, dispatch_json, Reply, Request, Response, StatusCategory};
pub use service::todo_store::{
    CreateOutcome, DeleteOutcome, ErrorKind, StoreError, StoreResult, TodoStore, UpdateOutcome,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
