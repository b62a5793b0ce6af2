//! Todo list domain model.
//!
//! # Responsibility
//! - Define the persisted shape `[{name, todos: [{id, ...fields}]}]`.
//! - Convert caller-supplied JSON values into typed items.
//! - Validate snapshots read back from a backend.
//!
//! # Invariants
//! - `TodoItem::id` is opaque: only equality is ever used.
//! - Caller-defined item fields are carried verbatim and never interpreted.
//! - A valid snapshot has no duplicate list names, no duplicate item ids
//!   within a list, and no list longer than the configured cap.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-supplied item identifier.
///
/// Serialized untagged so `1` and `"1"` stay distinct tokens on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    Number(Number),
    Text(String),
}

impl Display for TodoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for TodoId {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for TodoId {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TodoId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One todo entry: an id plus whatever fields the caller attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: TodoId,
    /// Everything except `id`, e.g. `title`, `completed`, `priority`.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TodoItem {
    /// Creates an item with no extra fields.
    pub fn new(id: impl Into<TodoId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter, mainly for tests and fixtures.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Converts a raw request value into an item.
    ///
    /// # Errors
    /// - `NotAnObject` when `value` is not a JSON object.
    /// - `MissingItemId` when `id` is absent or `null`.
    /// - `InvalidItemId` when `id` is neither a string nor a number.
    pub fn from_value(value: Value) -> Result<Self, TodoValidationError> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => return Err(TodoValidationError::NotAnObject(json_kind(&other))),
        };

        let id = match fields.remove("id") {
            None | Some(Value::Null) => return Err(TodoValidationError::MissingItemId),
            Some(Value::String(text)) => TodoId::Text(text),
            Some(Value::Number(number)) => TodoId::Number(number),
            Some(other) => return Err(TodoValidationError::InvalidItemId(json_kind(&other))),
        };

        Ok(Self { id, fields })
    }
}

/// A named list of items, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub name: String,
    #[serde(default)]
    pub todos: Vec<TodoItem>,
}

impl TodoList {
    /// Creates an empty list.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            todos: Vec::new(),
        }
    }

    /// Index of the item with `id`, if present.
    pub fn position_of(&self, id: &TodoId) -> Option<usize> {
        self.todos.iter().position(|item| &item.id == id)
    }

    /// Checks id uniqueness and the item cap.
    pub fn validate(&self, max_items: usize) -> Result<(), TodoValidationError> {
        if self.todos.len() > max_items {
            return Err(TodoValidationError::TooManyItems {
                list: self.name.clone(),
                count: self.todos.len(),
                max: max_items,
            });
        }

        let mut seen: Vec<&TodoId> = Vec::with_capacity(self.todos.len());
        for item in &self.todos {
            if seen.contains(&&item.id) {
                return Err(TodoValidationError::DuplicateItemId {
                    list: self.name.clone(),
                    id: item.id.clone(),
                });
            }
            seen.push(&item.id);
        }

        Ok(())
    }
}

/// The whole persisted store, newest list first.
///
/// Serialized as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreSnapshot {
    lists: Vec<TodoList>,
}

impl StoreSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_lists(lists: Vec<TodoList>) -> Self {
        Self { lists }
    }

    pub fn lists(&self) -> &[TodoList] {
        &self.lists
    }

    pub fn into_lists(self) -> Vec<TodoList> {
        self.lists
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&TodoList> {
        self.lists.iter().find(|list| list.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut TodoList> {
        self.lists.iter_mut().find(|list| list.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Inserts `list` at the front. Caller is responsible for uniqueness.
    pub fn push_front(&mut self, list: TodoList) {
        self.lists.insert(0, list);
    }

    /// Removes every list named `name`; returns whether any was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.lists.len();
        self.lists.retain(|list| list.name != name);
        self.lists.len() != before
    }

    /// Validates every list and name uniqueness across the snapshot.
    pub fn validate(&self, max_items: usize) -> Result<(), TodoValidationError> {
        let mut names = HashSet::with_capacity(self.lists.len());
        for list in &self.lists {
            list.validate(max_items)?;
            if !names.insert(list.name.as_str()) {
                return Err(TodoValidationError::DuplicateListName(list.name.clone()));
            }
        }
        Ok(())
    }
}

/// Structural violations of the todo model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    DuplicateListName(String),
    NotAnObject(&'static str),
    MissingItemId,
    InvalidItemId(&'static str),
    DuplicateItemId { list: String, id: TodoId },
    TooManyItems { list: String, count: usize, max: usize },
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateListName(name) => write!(f, "duplicate list name `{name}`"),
            Self::NotAnObject(kind) => write!(f, "todo must be an object, got {kind}"),
            Self::MissingItemId => write!(f, "todo must carry a non-null `id`"),
            Self::InvalidItemId(kind) => {
                write!(f, "todo `id` must be a string or number, got {kind}")
            }
            Self::DuplicateItemId { list, id } => {
                write!(f, "duplicate todo id `{id}` in list `{list}`")
            }
            Self::TooManyItems { list, count, max } => {
                write!(f, "list `{list}` holds {count} todos, limit is {max}")
            }
        }
    }
}

impl Error for TodoValidationError {}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
