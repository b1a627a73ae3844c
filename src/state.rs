use crate::config::Config;
use crate::storage::{EntryStore, FileStore, KeyValueStore};
use std::sync::Arc;

/// Shared by every handler. Holds no cached entries: each request reads the
/// store, so the backend stays the single source of truth.
#[derive(Clone)]
pub struct AppState {
    pub store: EntryStore,
}

impl AppState {
    pub fn new(backend: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        Self {
            store: EntryStore::new(backend, storage_key),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(FileStore::new(config.data_dir.clone())),
            config.storage_key.clone(),
        )
    }
}
