//! API handlers for the Web API.

mod file;

pub use file::*;

use std::sync::Arc;

use crate::db::Database;
use crate::file::BlobStorage;

/// Shared application state for the Web API.
pub struct AppState {
    /// Metadata store.
    pub db: Arc<Database>,
    /// Blob storage.
    pub storage: Arc<BlobStorage>,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Arc<Database>, storage: Arc<BlobStorage>, max_upload_size: u64) -> Self {
        Self {
            db,
            storage,
            max_upload_size,
        }
    }
}
