//! Store configuration.
//!
//! # Responsibility
//! - Parse `MAX_TODO_ITEMS` into a validated per-list cap.
//! - Hold the process-wide configuration, installed once at startup.
//!
//! # Invariants
//! - `max_todo_items` is always at least 1.
//! - Once installed, the process-wide value never changes.

use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

/// Environment variable holding the per-list item cap.
pub const MAX_TODO_ITEMS_ENV: &str = "MAX_TODO_ITEMS";

/// Cap used when `MAX_TODO_ITEMS` is unset.
pub const DEFAULT_MAX_TODO_ITEMS: usize = 10;

static STORE_CONFIG: OnceCell<StoreConfig> = OnceCell::new();

/// Immutable settings for one `TodoStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    max_todo_items: NonZeroUsize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_todo_items: NonZeroUsize::new(DEFAULT_MAX_TODO_ITEMS).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl StoreConfig {
    pub fn new(max_todo_items: NonZeroUsize) -> Self {
        Self { max_todo_items }
    }

    /// Builds a config from a raw cap, rejecting zero.
    pub fn with_max_todo_items(max_todo_items: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(max_todo_items)
            .map(Self::new)
            .ok_or_else(|| ConfigError::NonPositiveMaxTodoItems(max_todo_items.to_string()))
    }

    /// Reads `MAX_TODO_ITEMS` from the process environment.
    ///
    /// Unset falls back to `DEFAULT_MAX_TODO_ITEMS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_value(std::env::var(MAX_TODO_ITEMS_ENV).ok().as_deref())
    }

    /// Parses an optional raw `MAX_TODO_ITEMS` value.
    ///
    /// # Errors
    /// - `InvalidMaxTodoItems` for non-numeric input.
    /// - `NonPositiveMaxTodoItems` for zero or negative input.
    pub fn from_env_value(raw: Option<&str>) -> Result<Self, ConfigError> {
        let Some(raw) = raw.map(str::trim) else {
            return Ok(Self::default());
        };
        if raw.is_empty() {
            return Ok(Self::default());
        }

        match raw.parse::<i64>() {
            Ok(value) if value <= 0 => Err(ConfigError::NonPositiveMaxTodoItems(raw.to_string())),
            Ok(value) => usize::try_from(value)
                .map_err(|_| ConfigError::InvalidMaxTodoItems(raw.to_string()))
                .and_then(Self::with_max_todo_items),
            Err(_) => Err(ConfigError::InvalidMaxTodoItems(raw.to_string())),
        }
    }

    pub fn max_todo_items(&self) -> usize {
        self.max_todo_items.get()
    }
}

/// Installs the process-wide configuration.
///
/// Repeating the call with an equal value is a no-op; a different value is
/// rejected.
pub fn init_config(config: StoreConfig) -> Result<StoreConfig, ConfigError> {
    let active = *STORE_CONFIG.get_or_init(|| config);
    if active != config {
        return Err(ConfigError::AlreadyInitialized {
            active: active.max_todo_items(),
            requested: config.max_todo_items(),
        });
    }
    Ok(active)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidMaxTodoItems(String),
    NonPositiveMaxTodoItems(String),
    AlreadyInitialized { active: usize, requested: usize },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMaxTodoItems(raw) => {
                write!(f, "{MAX_TODO_ITEMS_ENV} must be an integer, got `{raw}`")
            }
            Self::NonPositiveMaxTodoItems(raw) => {
                write!(f, "{MAX_TODO_ITEMS_ENV} must be positive, got `{raw}`")
            }
            Self::AlreadyInitialized { active, requested } => write!(
                f,
                "store config already initialized with {MAX_TODO_ITEMS_ENV}={active}; refusing to switch to {requested}"
            ),
        }
    }
}

impl Error for ConfigError {}
