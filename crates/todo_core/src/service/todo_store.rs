//! Todo list store service.
//!
//! # Responsibility
//! - Provide `create` / `read` / `update` / `delete` over the whole store.
//! - Enforce name uniqueness, the per-list cap and upsert-by-id.
//! - Hold the only critical section around backend `load -> mutate -> save`.
//!
//! # Invariants
//! - Writers are mutually exclusive; readers share the gate with each other
//!   but never overlap a writer.
//! - A failed operation never reaches `save`, so persisted state is untouched.
//! - New lists and new items go to the front; replaced items keep their index.
//! - Reads hand out owned copies, never references into persisted state.

use crate::backend::{BackendError, StoreBackend};
use crate::config::StoreConfig;
use crate::model::todo::{StoreSnapshot, TodoId, TodoItem, TodoList, TodoValidationError};
use log::{info, warn};
use parking_lot::RwLock;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Typed failure of a store operation.
#[derive(Debug)]
pub enum StoreError {
    /// Required input absent or malformed.
    InvalidArgument(String),
    /// `create` on a name that is already taken.
    AlreadyExists(String),
    /// `update` on a list that does not exist.
    NotFound(String),
    /// `update` inserting into a full list.
    ResourceExhausted { list: String, max: usize },
    /// Request verb is not one of the four known operations.
    UnknownOperation(String),
    /// Backend could not load or save.
    Unavailable(BackendError),
}

/// Fieldless view of `StoreError`, for status mapping and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    AlreadyExists,
    NotFound,
    ResourceExhausted,
    UnknownOperation,
    Unavailable,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::AlreadyExists => "already_exists",
            Self::NotFound => "not_found",
            Self::ResourceExhausted => "resource_exhausted",
            Self::UnknownOperation => "unknown_operation",
            Self::Unavailable => "unavailable",
        }
    }

    /// Only backend unavailability is worth retrying.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
            Self::UnknownOperation(_) => ErrorKind::UnknownOperation,
            Self::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::AlreadyExists(name) => write!(f, "todo list `{name}` already exists"),
            Self::NotFound(name) => write!(f, "todo list `{name}` not found"),
            Self::ResourceExhausted { list, max } => {
                write!(f, "todo list `{list}` is full ({max} todos max)")
            }
            Self::UnknownOperation(operation) => write!(f, "unknown operation `{operation}`"),
            Self::Unavailable(err) => write!(f, "store unavailable: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for StoreError {
    fn from(value: BackendError) -> Self {
        Self::Unavailable(value)
    }
}

impl From<TodoValidationError> for StoreError {
    fn from(value: TodoValidationError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

/// Result of a successful `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub name: String,
}

impl CreateOutcome {
    pub fn message(&self) -> String {
        format!("todo list `{}` created", self.name)
    }
}

/// Which branch of upsert-by-id an `update` took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// New id, inserted at the front.
    Added { list: String, id: TodoId },
    /// Existing id, replaced in place.
    Updated { list: String, id: TodoId },
}

impl UpdateOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Added { list, id } => format!("todo `{id}` added to `{list}`"),
            Self::Updated { list, id } => format!("todo `{id}` updated in `{list}`"),
        }
    }

    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }
}

/// Result of a `delete`; succeeds whether or not the list existed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub name: String,
    pub removed: bool,
}

impl DeleteOutcome {
    pub fn message(&self) -> String {
        format!("todo list `{}` deleted", self.name)
    }
}

/// Todo list store over a pluggable backend.
pub struct TodoStore<B: StoreBackend> {
    backend: B,
    config: StoreConfig,
    gate: RwLock<()>,
}

impl<B: StoreBackend> TodoStore<B> {
    pub fn new(backend: B, config: StoreConfig) -> Self {
        Self {
            backend,
            config,
            gate: RwLock::new(()),
        }
    }

    pub fn max_todo_items(&self) -> usize {
        self.config.max_todo_items()
    }

    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates an empty list named `name` at the front of the store.
    ///
    /// # Errors
    /// - `InvalidArgument` for an empty name.
    /// - `AlreadyExists` when the name is taken; nothing is written.
    pub fn create(&self, name: &str) -> StoreResult<CreateOutcome> {
        let name = required_name(name)?;
        self.transact("store_create", |snapshot| {
            if snapshot.contains(name) {
                return Err(StoreError::AlreadyExists(name.to_string()));
            }
            snapshot.push_front(TodoList::new(name));
            Ok(Mutation::Changed(CreateOutcome {
                name: name.to_string(),
            }))
        })
    }

    /// Returns a copy of every list, newest first.
    pub fn read(&self) -> StoreResult<StoreSnapshot> {
        let _shared = self.gate.read();
        self.load_snapshot()
    }

    /// Returns a copy of one list, if it exists.
    pub fn read_list(&self, name: &str) -> StoreResult<Option<TodoList>> {
        let name = required_name(name)?;
        let _shared = self.gate.read();
        Ok(self
            .load_snapshot()?
            .into_lists()
            .into_iter()
            .find(|list| list.name == name))
    }

    /// Upserts `todo` into list `name` by item id.
    ///
    /// # Contract
    /// - Existing id: replaced at its current index.
    /// - New id: inserted at index 0 if the list has room.
    ///
    /// # Errors
    /// - `InvalidArgument` for an empty name.
    /// - `NotFound` when no list is named `name`.
    /// - `ResourceExhausted` when inserting into a full list.
    pub fn update(&self, name: &str, todo: TodoItem) -> StoreResult<UpdateOutcome> {
        let name = required_name(name)?;
        let max = self.max_todo_items();
        self.transact("store_update", |snapshot| {
            let list = snapshot
                .find_mut(name)
                .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

            let id = todo.id.clone();
            if let Some(index) = list.position_of(&id) {
                list.todos[index] = todo;
                return Ok(Mutation::Changed(UpdateOutcome::Updated {
                    list: name.to_string(),
                    id,
                }));
            }

            if list.todos.len() >= max {
                return Err(StoreError::ResourceExhausted {
                    list: name.to_string(),
                    max,
                });
            }
            list.todos.insert(0, todo);
            Ok(Mutation::Changed(UpdateOutcome::Added {
                list: name.to_string(),
                id,
            }))
        })
    }

    /// Removes list `name` and all of its todos. Idempotent.
    pub fn delete(&self, name: &str) -> StoreResult<DeleteOutcome> {
        let name = required_name(name)?;
        self.transact("store_delete", |snapshot| {
            let outcome = DeleteOutcome {
                name: name.to_string(),
                removed: snapshot.remove(name),
            };
            if outcome.removed {
                Ok(Mutation::Changed(outcome))
            } else {
                Ok(Mutation::Unchanged(outcome))
            }
        })
    }

    /// Runs one serialized `load -> mutate -> save` transaction.
    fn transact<T>(
        &self,
        event: &'static str,
        mutate: impl FnOnce(&mut StoreSnapshot) -> StoreResult<Mutation<T>>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let _exclusive = self.gate.write();

        let result = self.load_snapshot().and_then(|mut snapshot| {
            match mutate(&mut snapshot)? {
                Mutation::Changed(value) => {
                    self.backend.save(&snapshot)?;
                    Ok((value, true, snapshot.len()))
                }
                Mutation::Unchanged(value) => Ok((value, false, snapshot.len())),
            }
        });

        match result {
            Ok((value, persisted, lists)) => {
                info!(
                    "event={} module=store status=ok persisted={} lists={} duration_ms={}",
                    event,
                    persisted,
                    lists,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                warn!(
                    "event={} module=store status=error error_code={} duration_ms={}",
                    event,
                    err.kind().as_str(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Loads and structurally validates the persisted snapshot.
    ///
    /// Broken structure (duplicate names or ids) degrades to an
    /// empty store. Over-cap lists are kept: the cap only gates inserts.
    fn load_snapshot(&self) -> StoreResult<StoreSnapshot> {
        let snapshot = self.backend.load()?;
        match snapshot.validate(usize::MAX) {
            Ok(()) => Ok(snapshot),
            Err(err) => {
                warn!(
                    "event=backend_load module=store status=degraded lists={} error_code=invalid_document error={}",
                    snapshot.len(),
                    err
                );
                Ok(StoreSnapshot::empty())
            }
        }
    }
}

enum Mutation<T> {
    Changed(T),
    Unchanged(T),
}

/// Names are compared byte-for-byte; only the empty string is rejected.
fn required_name(name: &str) -> StoreResult<&str> {
    if name.is_empty() {
        return Err(StoreError::InvalidArgument(
            "`name` is required and cannot be empty".to_string(),
        ));
    }
    Ok(name)
}
