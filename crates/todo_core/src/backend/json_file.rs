//! Single JSON document on the local filesystem.
//!
//! # Invariants
//! - Writes land in a sibling temp file, are synced, then renamed over the
//!   target, so a reader never observes a partial document.
//! - On unix the directory is synced after the rename, so the new entry
//!   survives a power loss.
//! - A missing file is a fresh store, not an error.

use super::{decode_snapshot, encode_snapshot, BackendResult, StoreBackend};
use crate::model::todo::StoreSnapshot;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// `StoreBackend` persisting to one file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl StoreBackend for JsonFileBackend {
    fn load(&self) -> BackendResult<StoreSnapshot> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(decode_snapshot(&raw, "file")),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(StoreSnapshot::empty()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, snapshot: &StoreSnapshot) -> BackendResult<()> {
        let raw = encode_snapshot(snapshot)?;
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(raw.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|err| err.error)?;
        sync_dir(dir)?;
        Ok(())
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::JsonFileBackend;
    use crate::backend::StoreBackend;
    use crate::model::todo::{StoreSnapshot, TodoItem, TodoList};

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("todos.json"));
        assert!(backend.load().unwrap().is_empty());
    }

    #[test]
    fn save_creates_parent_dirs_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("todos.json");
        let backend = JsonFileBackend::new(&path);

        let mut list = TodoList::new("Work");
        list.todos.push(TodoItem::new("a").with_field("title", "ship"));
        let snapshot = StoreSnapshot::from_lists(vec![list]);
        backend.save(&snapshot).unwrap();

        assert_eq!(backend.load().unwrap(), snapshot);
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn repeated_saves_replace_the_document_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        let backend = JsonFileBackend::new(&path);

        backend
            .save(&StoreSnapshot::from_lists(vec![TodoList::new("Old")]))
            .unwrap();
        let newer = StoreSnapshot::from_lists(vec![TodoList::new("New"), TodoList::new("Old")]);
        backend.save(&newer).unwrap();
        backend.save(&newer).unwrap();

        assert_eq!(JsonFileBackend::new(&path).load().unwrap(), newer);
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn bare_file_name_stages_in_the_current_directory() {
        let backend = JsonFileBackend::new("todos.json");
        assert_eq!(backend.parent_dir(), std::path::Path::new("."));
    }

    #[cfg(unix)]
    #[test]
    fn directory_sync_fails_for_a_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(super::sync_dir(dir.path()).is_ok());
        assert!(super::sync_dir(&dir.path().join("gone")).is_err());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        std::fs::write(&path, "{{{").unwrap();
        assert!(JsonFileBackend::new(path).load().unwrap().is_empty());
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where a file is expected.
        let backend = JsonFileBackend::new(dir.path());
        assert!(backend.load().is_err());
    }
}
