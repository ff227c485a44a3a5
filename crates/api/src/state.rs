use std::sync::Arc;

use renotracker_storage::{ObjectStore, StorageError};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: renotracker_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Document object store. `None` when storage credentials are not configured.
    pub storage: Option<Arc<dyn ObjectStore>>,
}

impl AppState {
    /// The configured object store, or [`StorageError::NotConfigured`].
    pub fn storage(&self) -> Result<&Arc<dyn ObjectStore>, StorageError> {
        self.storage.as_ref().ok_or(StorageError::NotConfigured)
    }
}
