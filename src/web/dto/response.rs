//! Response DTOs for the Web API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::file::{FileRecord, MimetypeCount, RecentFile, StatsSummary, URL_PREFIX};

/// A file record as exposed over the API.
///
/// The internal storage path is never part of this shape; `url` is derived
/// from the storage filename at serialization time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// Record ID.
    pub id: i64,
    /// Generated storage filename.
    pub filename: String,
    /// Original filename as uploaded.
    pub original_name: String,
    /// Declared content type.
    pub mimetype: String,
    /// File size in bytes.
    pub size: i64,
    /// Uploader label.
    pub uploaded_by: String,
    /// File description.
    pub description: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Number of successful downloads.
    pub download_count: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-modified timestamp.
    pub updated_at: DateTime<Utc>,
    /// Derived public URL for the blob.
    pub url: String,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        let url = format!("{}/{}", URL_PREFIX, record.filename);
        Self {
            id: record.id,
            filename: record.filename,
            original_name: record.original_name,
            mimetype: record.mimetype,
            size: record.size,
            uploaded_by: record.uploaded_by,
            description: record.description,
            tags: record.tags,
            download_count: record.download_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
            url,
        }
    }
}

/// Response for a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Status message.
    pub message: String,
    /// The created file record.
    pub file: FileResponse,
}

/// Response for a successful metadata update.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    /// Status message.
    pub message: String,
    /// The updated file record.
    pub file: FileResponse,
}

/// Plain status message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Status message.
    pub message: String,
}

/// Pagination metadata for listings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page number.
    pub current: u32,
    /// Total number of pages.
    pub total: u32,
    /// Number of records in this page.
    pub count: usize,
    /// Total number of records in the filtered set.
    pub total_files: i64,
}

/// Response for GET /api/files.
#[derive(Debug, Serialize)]
pub struct ListFilesResponse {
    /// The page of file records.
    pub files: Vec<FileResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Per-content-type count in the statistics response.
#[derive(Debug, Serialize)]
pub struct FileTypeCount {
    /// Exact content-type string.
    pub mimetype: String,
    /// Number of records with this type.
    pub count: i64,
}

impl From<MimetypeCount> for FileTypeCount {
    fn from(count: MimetypeCount) -> Self {
        Self {
            mimetype: count.mimetype,
            count: count.count,
        }
    }
}

/// Recent file projection in the statistics response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFileResponse {
    /// Original filename.
    pub original_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// File size in bytes.
    pub size: i64,
    /// Declared content type.
    pub mimetype: String,
}

impl From<RecentFile> for RecentFileResponse {
    fn from(recent: RecentFile) -> Self {
        Self {
            original_name: recent.original_name,
            created_at: recent.created_at,
            size: recent.size,
            mimetype: recent.mimetype,
        }
    }
}

/// Response for GET /api/files/stats/summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Total number of records.
    pub total_files: i64,
    /// Sum of all record sizes in bytes.
    pub total_size: i64,
    /// Per-content-type counts, most common first.
    pub file_types: Vec<FileTypeCount>,
    /// The most recently created records.
    pub recent_files: Vec<RecentFileResponse>,
}

impl From<StatsSummary> for StatsResponse {
    fn from(stats: StatsSummary) -> Self {
        Self {
            total_files: stats.total_files,
            total_size: stats.total_size_bytes,
            file_types: stats.counts_by_mimetype.into_iter().map(Into::into).collect(),
            recent_files: stats.recent.into_iter().map(Into::into).collect(),
        }
    }
}
