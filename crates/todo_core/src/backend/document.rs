//! Aggregate-document encoding over a key-value medium.
//!
//! The whole store lives under a single key as one JSON array, so list names
//! and item ids always change together.

use super::{decode_snapshot, encode_snapshot, BackendResult, KeyValueStore, StoreBackend};
use crate::model::todo::StoreSnapshot;

/// Key used when none is configured.
pub const DEFAULT_DOCUMENT_KEY: &str = "todoList";

/// `StoreBackend` that keeps the snapshot under one key of `K`.
pub struct DocumentBackend<K: KeyValueStore> {
    kv: K,
    key: String,
}

impl<K: KeyValueStore> DocumentBackend<K> {
    pub fn new(kv: K) -> Self {
        Self::with_key(kv, DEFAULT_DOCUMENT_KEY)
    }

    pub fn with_key(kv: K, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }
}

impl<K: KeyValueStore> StoreBackend for DocumentBackend<K> {
    fn load(&self) -> BackendResult<StoreSnapshot> {
        match self.kv.get(&self.key)? {
            Some(raw) => Ok(decode_snapshot(&raw, &format!("kv:{}", self.key))),
            None => Ok(StoreSnapshot::empty()),
        }
    }

    fn save(&self, snapshot: &StoreSnapshot) -> BackendResult<()> {
        let raw = encode_snapshot(snapshot)?;
        self.kv.put(&self.key, &raw)
    }
}
