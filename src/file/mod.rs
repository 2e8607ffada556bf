//! File management module for Depot.
//!
//! This module contains the ingestion, retrieval, and deletion pipelines
//! and their collaborators:
//! - Upload validation by extension/content type and size ceiling
//! - Collision-resistant storage filename generation
//! - Filesystem blob storage
//! - File record repository with queries and aggregation
//! - The file service tying the stores together

mod metadata;
mod naming;
mod service;
mod storage;
mod validation;

pub use metadata::{
    FileRecord, FileRepository, FileUpdate, ListQuery, MimetypeCount, NewFile, RecentFile,
    SortField, SortOrder, StoredFile,
};
pub use naming::storage_name;
pub use service::{DownloadResult, FileService, StatsSummary, TagInput, UploadRequest};
pub use storage::BlobStorage;
pub use validation::{UploadPolicy, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_ALLOWED_MIMETYPES};

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Number of records returned in the statistics "recent" projection.
pub const RECENT_FILES_LIMIT: i64 = 5;

/// Path prefix for the derived public `url` field of a file record.
pub const URL_PREFIX: &str = "/uploads";
