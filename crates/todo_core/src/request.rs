//! Transport-agnostic request dispatch.
//!
//! # Responsibility
//! - Decode `{operation, name, todo}` requests.
//! - Route them to `TodoStore` and shape `{message?, todoList?}` /
//!   `{error}` responses.
//! - Map each error kind to a `StatusCategory` a transport can translate.
//!
//! # Invariants
//! - Missing fields surface as `InvalidArgument`, never as parse failures.
//! - Dispatch never panics and never bypasses store validation.

use crate::backend::StoreBackend;
use crate::model::todo::{TodoItem, TodoList};
use crate::service::todo_store::{ErrorKind, StoreError, StoreResult, TodoStore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Recognized verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn parse(raw: &str) -> StoreResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(StoreError::UnknownOperation(raw.to_string())),
        }
    }
}

/// Inbound request. Every field is optional at the wire level.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Request {
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub todo: Option<Value>,
}

impl Request {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_todo(mut self, todo: Value) -> Self {
        self.todo = Some(todo);
        self
    }
}

/// Outbound body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(rename = "todoList", skip_serializing_if = "Option::is_none")]
        todo_list: Option<Vec<TodoList>>,
    },
    Failure {
        error: String,
    },
}

impl Response {
    fn message(message: String) -> Self {
        Self::Success {
            message: Some(message),
            todo_list: None,
        }
    }

    fn lists(todo_list: Vec<TodoList>) -> Self {
        Self::Success {
            message: None,
            todo_list: Some(todo_list),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Caller-visible outcome class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    Ok,
    Created,
    BadRequest,
    NotFound,
    Conflict,
    ResourceExhausted,
    Unavailable,
}

impl StatusCategory {
    pub fn http_status(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::ResourceExhausted => 507,
            Self::Unavailable => 503,
        }
    }
}

impl From<ErrorKind> for StatusCategory {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidArgument | ErrorKind::UnknownOperation => Self::BadRequest,
            ErrorKind::AlreadyExists => Self::Conflict,
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::ResourceExhausted => Self::ResourceExhausted,
            ErrorKind::Unavailable => Self::Unavailable,
        }
    }
}

/// Status plus body for one dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCategory,
    pub response: Response,
}

impl Reply {
    fn ok(status: StatusCategory, response: Response) -> Self {
        Self { status, response }
    }

    fn failure(err: &StoreError) -> Self {
        Self {
            status: err.kind().into(),
            response: Response::Failure {
                error: err.to_string(),
            },
        }
    }
}

/// Routes one request to the store.
pub fn dispatch<B: StoreBackend>(store: &TodoStore<B>, request: Request) -> Reply {
    match route(store, request) {
        Ok(reply) => reply,
        Err(err) => Reply::failure(&err),
    }
}

/// Parses one JSON request document and dispatches it.
pub fn dispatch_json<B: StoreBackend>(store: &TodoStore<B>, raw: &str) -> Reply {
    match serde_json::from_str::<Request>(raw) {
        Ok(request) => dispatch(store, request),
        Err(err) => Reply::failure(&StoreError::InvalidArgument(format!(
            "request is not valid JSON: {err}"
        ))),
    }
}

fn route<B: StoreBackend>(store: &TodoStore<B>, request: Request) -> StoreResult<Reply> {
    let Request {
        operation,
        name,
        todo,
    } = request;

    let operation = operation
        .ok_or_else(|| StoreError::InvalidArgument("`operation` is required".to_string()))?;

    match Operation::parse(&operation)? {
        Operation::Create => {
            let outcome = store.create(&require_name(name)?)?;
            Ok(Reply::ok(
                StatusCategory::Created,
                Response::message(outcome.message()),
            ))
        }
        Operation::Read => {
            // An optional `name` narrows the read to that list.
            let lists = match name.filter(|name| !name.is_empty()) {
                Some(name) => store.read_list(&name)?.into_iter().collect(),
                None => store.read()?.into_lists(),
            };
            Ok(Reply::ok(StatusCategory::Ok, Response::lists(lists)))
        }
        Operation::Update => {
            let name = require_name(name)?;
            let todo = todo
                .filter(|value| !value.is_null())
                .ok_or_else(|| StoreError::InvalidArgument("`todo` is required".to_string()))?;
            let outcome = store.update(&name, TodoItem::from_value(todo)?)?;
            Ok(Reply::ok(
                StatusCategory::Ok,
                Response::message(outcome.message()),
            ))
        }
        Operation::Delete => {
            let outcome = store.delete(&require_name(name)?)?;
            Ok(Reply::ok(
                StatusCategory::Ok,
                Response::message(outcome.message()),
            ))
        }
    }
}

fn require_name(name: Option<String>) -> StoreResult<String> {
    name.ok_or_else(|| StoreError::InvalidArgument("`name` is required".to_string()))
}
