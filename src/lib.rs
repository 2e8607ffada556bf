//! Depot - a single-node file upload service.
//!
//! Clients upload binary files with metadata (uploader, description, tags),
//! list and paginate them, download them with download-count tracking, and
//! retrieve aggregate statistics. Metadata lives in SQLite; blobs live in a
//! flat directory on the local filesystem.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{DepotError, Result};
pub use file::{
    BlobStorage, DownloadResult, FileRecord, FileRepository, FileService, FileUpdate, ListQuery,
    NewFile, SortField, SortOrder, StatsSummary, TagInput, UploadPolicy, UploadRequest,
};
pub use web::WebServer;
