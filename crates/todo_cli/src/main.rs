//! Line-oriented driver for the todo store.
//!
//! # Responsibility
//! - Build a store from environment configuration.
//! - Read one JSON request per stdin line, write one JSON reply per line.
//!
//! Environment:
//! - `MAX_TODO_ITEMS`: per-list cap (default 10).
//! - `TODO_STORE_BACKEND`: `json` (default) or `sqlite`.
//! - `TODO_STORE_PATH`: data file (default `todo_store.json` / `todo_store.sqlite3`).
//! - `TODO_STORE_LOG_DIR` / `TODO_STORE_LOG_LEVEL`: enable file logging.

use log::info;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use todo_core::{
    default_log_level, dispatch_json, init_config, init_logging, DocumentBackend,
    JsonFileBackend, Reply, SqliteKeyValueStore, StoreBackend, StoreConfig, TodoStore,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("todo_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    if let Ok(log_dir) = std::env::var("TODO_STORE_LOG_DIR") {
        let level = std::env::var("TODO_STORE_LOG_LEVEL")
            .unwrap_or_else(|_| default_log_level().to_string());
        init_logging(&level, &log_dir).map_err(|err| err.to_string())?;
    }

    let config = StoreConfig::from_env()
        .and_then(init_config)
        .map_err(|err| err.to_string())?;
    let backend_kind = std::env::var("TODO_STORE_BACKEND").unwrap_or_else(|_| "json".to_string());
    let path = std::env::var("TODO_STORE_PATH").ok();
    info!(
        "event=cli_start module=cli status=ok backend={} max_todo_items={} version={}",
        backend_kind,
        config.max_todo_items(),
        todo_core::core_version()
    );

    match backend_kind.trim().to_ascii_lowercase().as_str() {
        "json" => {
            let path = path.unwrap_or_else(|| "todo_store.json".to_string());
            serve(TodoStore::new(JsonFileBackend::new(path), config))
        }
        "sqlite" => {
            let path = path.unwrap_or_else(|| "todo_store.sqlite3".to_string());
            let kv = SqliteKeyValueStore::open(&path).map_err(|err| err.to_string())?;
            serve(TodoStore::new(DocumentBackend::new(kv), config))
        }
        other => Err(format!(
            "unsupported TODO_STORE_BACKEND `{other}`; expected json|sqlite"
        )),
    }
}

fn serve<B: StoreBackend>(store: TodoStore<B>) -> Result<(), String> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.map_err(|err| format!("failed to read stdin: {err}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = dispatch_json(&store, &line);
        writeln!(stdout, "{}", render(&reply))
            .and_then(|()| stdout.flush())
            .map_err(|err| format!("failed to write stdout: {err}"))?;
    }

    Ok(())
}

fn render(reply: &Reply) -> serde_json::Value {
    serde_json::json!({
        "status": reply.status.http_status(),
        "body": reply.response,
    })
}
