//! File service for Depot.
//!
//! High-level pipelines over the blob store and the metadata store:
//! ingestion with rollback, download with counter tracking, metadata
//! updates, deletion, listing, and statistics.

use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::db::Database;
use crate::{DepotError, Result};

use super::metadata::{
    FileRecord, FileRepository, FileUpdate, ListQuery, MimetypeCount, NewFile, RecentFile,
};
use super::naming::storage_name;
use super::storage::BlobStorage;
use super::validation::UploadPolicy;
use super::{DEFAULT_MAX_UPLOAD_SIZE, RECENT_FILES_LIMIT};

/// Tags as supplied by a client: either a list or a comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    /// A list of tags.
    List(Vec<String>),
    /// A comma-separated string, e.g. `"x, y"`.
    Text(String),
}

impl TagInput {
    /// Normalize into a tag list: elements trimmed, empties dropped,
    /// order and duplicates kept.
    pub fn into_tags(self) -> Vec<String> {
        match self {
            TagInput::List(tags) => tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            TagInput::Text(text) => text
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

/// Request data for a file ingestion.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename.
    pub original_name: String,
    /// Declared content type.
    pub mimetype: String,
    /// File content.
    pub content: Vec<u8>,
    /// Uploader label. Defaults to `"anonymous"`.
    pub uploaded_by: Option<String>,
    /// Description. Defaults to empty.
    pub description: Option<String>,
    /// Tags.
    pub tags: Option<TagInput>,
}

impl UploadRequest {
    /// Create a new upload request.
    pub fn new(
        original_name: impl Into<String>,
        mimetype: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            mimetype: mimetype.into(),
            content,
            uploaded_by: None,
            description: None,
            tags: None,
        }
    }

    /// Set the uploader label.
    pub fn with_uploaded_by(mut self, uploaded_by: impl Into<String>) -> Self {
        self.uploaded_by = Some(uploaded_by.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: TagInput) -> Self {
        self.tags = Some(tags);
        self
    }
}

/// Result of a file download.
#[derive(Debug)]
pub struct DownloadResult {
    /// The file record (path stripped).
    pub record: FileRecord,
    /// File content.
    pub content: Vec<u8>,
}

/// Aggregate statistics over all file records.
#[derive(Debug)]
pub struct StatsSummary {
    /// Total number of records.
    pub total_files: i64,
    /// Sum of all record sizes in bytes. Zero when empty.
    pub total_size_bytes: i64,
    /// Per-content-type counts, most common first.
    pub counts_by_mimetype: Vec<MimetypeCount>,
    /// The most recently created records.
    pub recent: Vec<RecentFile>,
}

/// File service coordinating the blob store and the metadata store.
pub struct FileService<'a> {
    db: &'a Database,
    storage: &'a BlobStorage,
    policy: UploadPolicy,
    max_upload_size: u64,
}

impl<'a> FileService<'a> {
    /// Create a new FileService with the default policy and size ceiling.
    pub fn new(db: &'a Database, storage: &'a BlobStorage) -> Self {
        Self {
            db,
            storage,
            policy: UploadPolicy::default(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Set a custom maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, max_size: u64) -> Self {
        self.max_upload_size = max_size;
        self
    }

    /// Set a custom validation policy.
    pub fn with_policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get the configured maximum upload size.
    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    /// Ingest an uploaded file.
    ///
    /// Validates before touching storage, writes the blob durably, then
    /// inserts the metadata record. If the insert fails the blob is
    /// removed again so no orphan is left behind; a failed cleanup is
    /// logged and does not mask the insert error.
    pub async fn ingest(&self, request: UploadRequest) -> Result<FileRecord> {
        self.policy
            .check_size(request.content.len() as u64, self.max_upload_size)?;
        self.policy.check(&request.original_name, &request.mimetype)?;

        let filename = storage_name(&request.original_name, Utc::now().timestamp_millis());
        let path = self.storage.save(&filename, &request.content).await?;

        let mut new_file = NewFile::new(
            &filename,
            &request.original_name,
            &request.mimetype,
            request.content.len() as i64,
            path.to_string_lossy(),
        );
        if let Some(uploaded_by) = request.uploaded_by.filter(|u| !u.trim().is_empty()) {
            new_file = new_file.with_uploaded_by(uploaded_by);
        }
        if let Some(description) = request.description {
            new_file = new_file.with_description(description);
        }
        if let Some(tags) = request.tags {
            new_file = new_file.with_tags(tags.into_tags());
        }

        let repo = FileRepository::new(self.db.pool());
        match repo.create(&new_file).await {
            Ok(stored) => Ok(stored.into()),
            Err(err) => {
                if let Err(cleanup) = self.storage.delete(&filename).await {
                    warn!(
                        "failed to remove blob {} after metadata insert error: {}",
                        filename, cleanup
                    );
                }
                Err(err)
            }
        }
    }

    /// Get file metadata by ID.
    pub async fn get_metadata(&self, id: i64) -> Result<FileRecord> {
        let repo = FileRepository::new(self.db.pool());
        let stored = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        Ok(stored.into())
    }

    /// Download a file.
    ///
    /// Verifies the blob still exists before counting: a record whose blob
    /// is gone surfaces as [`DepotError::BlobMissing`], distinct from
    /// [`DepotError::NotFound`]. The counter update is advisory; if it
    /// fails the download still proceeds.
    pub async fn download(&self, id: i64) -> Result<DownloadResult> {
        let repo = FileRepository::new(self.db.pool());
        let stored = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        if !self.storage.exists(&stored.filename).await {
            return Err(DepotError::BlobMissing(stored.filename));
        }

        if let Err(err) = repo.increment_downloads(stored.id).await {
            warn!("failed to count download for file {}: {}", stored.id, err);
        }

        let content = self.storage.load(&stored.filename).await?;

        Ok(DownloadResult {
            record: stored.into(),
            content,
        })
    }

    /// Update file metadata.
    ///
    /// Only supplied fields change. Returns the updated record.
    pub async fn update_metadata(
        &self,
        id: i64,
        description: Option<String>,
        uploaded_by: Option<String>,
        tags: Option<TagInput>,
    ) -> Result<FileRecord> {
        let mut update = FileUpdate::new();
        if let Some(description) = description {
            update = update.description(description);
        }
        if let Some(uploaded_by) = uploaded_by {
            update = update.uploaded_by(uploaded_by);
        }
        if let Some(tags) = tags {
            update = update.tags(tags.into_tags());
        }

        let repo = FileRepository::new(self.db.pool());
        let stored = repo
            .update(id, &update)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        Ok(stored.into())
    }

    /// Delete a file: blob first, then the metadata record.
    ///
    /// A blob that is already gone is not an error; a crash between the
    /// two steps leaves an orphaned record, which is detectable, rather
    /// than an orphaned blob, which is not.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let repo = FileRepository::new(self.db.pool());
        let stored = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        self.storage.delete(&stored.filename).await?;
        repo.delete(stored.id).await?;

        Ok(())
    }

    /// List files with filtering, sorting, and pagination.
    ///
    /// Returns the page of records and the total count of the filtered set.
    pub async fn list(&self, query: &ListQuery) -> Result<(Vec<FileRecord>, i64)> {
        let repo = FileRepository::new(self.db.pool());

        let files = repo.list(query).await?;
        let total = repo.count(query.uploaded_by.as_deref()).await?;

        Ok((files.into_iter().map(FileRecord::from).collect(), total))
    }

    /// Compute aggregate statistics over all records.
    pub async fn summarize(&self) -> Result<StatsSummary> {
        let repo = FileRepository::new(self.db.pool());

        let total_files = repo.count_all().await?;
        let total_size_bytes = repo.total_size().await?;
        let counts_by_mimetype = repo.counts_by_mimetype().await?;
        let recent = repo.recent(RECENT_FILES_LIMIT).await?;

        Ok(StatsSummary {
            total_files,
            total_size_bytes,
            counts_by_mimetype,
            recent,
        })
    }
}
