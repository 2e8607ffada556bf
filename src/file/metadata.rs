//! File record types and repository for the metadata store.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, SqlitePool};

use crate::{DepotError, Result};

/// A file record as stored, including the internal storage path.
///
/// This is the repository's entity type. It never crosses the service
/// boundary; callers receive [`FileRecord`] projections instead.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Unique record ID, assigned by the store on insert.
    pub id: i64,
    /// Generated storage filename (unique).
    pub filename: String,
    /// Original filename as uploaded (not unique).
    pub original_name: String,
    /// Declared content type.
    pub mimetype: String,
    /// File size in bytes.
    pub size: i64,
    /// Internal storage path. Never serialized outward.
    pub path: String,
    /// Uploader label (free text).
    pub uploaded_by: String,
    /// File description.
    pub description: String,
    /// Tags, in upload order. Duplicates permitted.
    pub tags: Vec<String>,
    /// Number of successful downloads.
    pub download_count: i64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for StoredFile {
    fn from_row(row: &SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let tags: String = row.try_get("tags")?;

        Ok(Self {
            id: row.try_get("id")?,
            filename: row.try_get("filename")?,
            original_name: row.try_get("original_name")?,
            mimetype: row.try_get("mimetype")?,
            size: row.try_get("size")?,
            path: row.try_get("path")?,
            uploaded_by: row.try_get("uploaded_by")?,
            description: row.try_get("description")?,
            tags: serde_json::from_str(&tags).unwrap_or_default(),
            download_count: row.try_get("download_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Public projection of a file record, with the storage path stripped.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Unique record ID.
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
    /// Tags, in upload order.
    pub tags: Vec<String>,
    /// Number of successful downloads.
    pub download_count: i64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

impl From<StoredFile> for FileRecord {
    fn from(stored: StoredFile) -> Self {
        Self {
            id: stored.id,
            filename: stored.filename,
            original_name: stored.original_name,
            mimetype: stored.mimetype,
            size: stored.size,
            uploaded_by: stored.uploaded_by,
            description: stored.description,
            tags: stored.tags,
            download_count: stored.download_count,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Generated storage filename.
    pub filename: String,
    /// Original filename.
    pub original_name: String,
    /// Declared content type.
    pub mimetype: String,
    /// File size in bytes.
    pub size: i64,
    /// Internal storage path.
    pub path: String,
    /// Uploader label.
    pub uploaded_by: String,
    /// File description.
    pub description: String,
    /// Tags.
    pub tags: Vec<String>,
}

impl NewFile {
    /// Create a new NewFile with default uploader, description, and tags.
    pub fn new(
        filename: impl Into<String>,
        original_name: impl Into<String>,
        mimetype: impl Into<String>,
        size: i64,
        path: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            original_name: original_name.into(),
            mimetype: mimetype.into(),
            size,
            path: path.into(),
            uploaded_by: "anonymous".to_string(),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    /// Set the uploader label.
    pub fn with_uploaded_by(mut self, uploaded_by: impl Into<String>) -> Self {
        self.uploaded_by = uploaded_by.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Builder for partial metadata updates.
#[derive(Debug, Clone, Default)]
pub struct FileUpdate {
    /// New description.
    pub description: Option<String>,
    /// New uploader label.
    pub uploaded_by: Option<String>,
    /// New tags.
    pub tags: Option<Vec<String>>,
}

impl FileUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the uploader label.
    pub fn uploaded_by(mut self, uploaded_by: impl Into<String>) -> Self {
        self.uploaded_by = Some(uploaded_by.into());
        self
    }

    /// Set the tags.
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.uploaded_by.is_none() && self.tags.is_none()
    }
}

/// Sortable fields for file listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    /// Creation time (default).
    #[default]
    CreatedAt,
    /// Original filename.
    OriginalName,
    /// File size.
    Size,
    /// Download counter.
    DownloadCount,
    /// Uploader label.
    UploadedBy,
}

impl SortField {
    /// The column name to sort by.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::OriginalName => "original_name",
            SortField::Size => "size",
            SortField::DownloadCount => "download_count",
            SortField::UploadedBy => "uploaded_by",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = DepotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "originalName" | "original_name" => Ok(SortField::OriginalName),
            "size" => Ok(SortField::Size),
            "downloadCount" | "download_count" => Ok(SortField::DownloadCount),
            "uploadedBy" | "uploaded_by" => Ok(SortField::UploadedBy),
            other => Err(DepotError::Validation(format!(
                "unknown sort field: {other}"
            ))),
        }
    }
}

/// Sort direction for file listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending (default).
    #[default]
    Desc,
}

impl SortOrder {
    /// The SQL keyword for this direction.
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = DepotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(DepotError::Validation(format!(
                "unknown sort order: {other}"
            ))),
        }
    }
}

/// Listing parameters: filter, sort, and offset pagination.
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// Filter by uploader label (exact match).
    pub uploaded_by: Option<String>,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Sort field.
    pub sort: SortField,
    /// Sort direction.
    pub order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            uploaded_by: None,
            page: 1,
            per_page: 50,
            sort: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

impl ListQuery {
    /// Create a query with default paging and sort.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by uploader label.
    pub fn uploaded_by(mut self, uploaded_by: impl Into<String>) -> Self {
        self.uploaded_by = Some(uploaded_by.into());
        self
    }

    /// Set the page number (1-based).
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the page size.
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set the sort field and direction.
    pub fn sort(mut self, sort: SortField, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }
}

/// Per-mimetype record count.
#[derive(Debug, Clone)]
pub struct MimetypeCount {
    /// Exact content-type string.
    pub mimetype: String,
    /// Number of records with this type.
    pub count: i64,
}

/// Minimal projection of a recently created record.
#[derive(Debug, Clone)]
pub struct RecentFile {
    /// Original filename.
    pub original_name: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// File size in bytes.
    pub size: i64,
    /// Declared content type.
    pub mimetype: String,
}

const SELECT_COLUMNS: &str = "id, filename, original_name, mimetype, size, path, uploaded_by, \
                              description, tags, download_count, created_at, updated_at";

/// Repository for file record CRUD, queries, and aggregation.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new file record.
    ///
    /// Returns the created record with the assigned ID and timestamps.
    pub async fn create(&self, new_file: &NewFile) -> Result<StoredFile> {
        let now = Utc::now();
        let tags = serde_json::to_string(&new_file.tags).unwrap_or_else(|_| "[]".to_string());

        let result = sqlx::query(
            "INSERT INTO files (filename, original_name, mimetype, size, path, uploaded_by, \
             description, tags, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_file.filename)
        .bind(&new_file.original_name)
        .bind(&new_file.mimetype)
        .bind(new_file.size)
        .bind(&new_file.path)
        .bind(&new_file.uploaded_by)
        .bind(&new_file.description)
        .bind(tags)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))
    }

    /// Get a file record by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<StoredFile>> {
        let result = sqlx::query_as::<_, StoredFile>(&format!(
            "SELECT {SELECT_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a file record by storage filename.
    pub async fn get_by_filename(&self, filename: &str) -> Result<Option<StoredFile>> {
        let result = sqlx::query_as::<_, StoredFile>(&format!(
            "SELECT {SELECT_COLUMNS} FROM files WHERE filename = ?"
        ))
        .bind(filename)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(result)
    }

    /// List file records with filtering, sorting, and offset pagination.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<StoredFile>> {
        let page = query.page.max(1);
        let per_page = query.per_page.max(1);
        let offset = (page as i64 - 1) * per_page as i64;

        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("SELECT {SELECT_COLUMNS} FROM files"));

        if let Some(ref uploaded_by) = query.uploaded_by {
            builder.push(" WHERE uploaded_by = ");
            builder.push_bind(uploaded_by);
        }

        // Sort column comes from the SortField whitelist, never from input.
        builder.push(format!(
            " ORDER BY {} {}, id DESC LIMIT ",
            query.sort.column(),
            query.order.sql()
        ));
        builder.push_bind(per_page as i64);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let files = builder
            .build_query_as::<StoredFile>()
            .fetch_all(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(files)
    }

    /// Count records matching an optional uploader filter.
    ///
    /// Computed independently of any page window.
    pub async fn count(&self, uploaded_by: Option<&str>) -> Result<i64> {
        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM files");

        if let Some(uploaded_by) = uploaded_by {
            builder.push(" WHERE uploaded_by = ");
            builder.push_bind(uploaded_by);
        }

        let count: (i64,) = builder
            .build_query_as()
            .fetch_one(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(count.0)
    }

    /// Update a file record.
    ///
    /// Only fields that are set in the update are modified; `updated_at`
    /// is touched whenever anything changes. Returns the updated record,
    /// or None if not found.
    pub async fn update(&self, id: i64, update: &FileUpdate) -> Result<Option<StoredFile>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE files SET ");
        let mut separated = builder.separated(", ");

        if let Some(ref description) = update.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }
        if let Some(ref uploaded_by) = update.uploaded_by {
            separated.push("uploaded_by = ");
            separated.push_bind_unseparated(uploaded_by);
        }
        if let Some(ref tags) = update.tags {
            let tags = serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string());
            separated.push("tags = ");
            separated.push_bind_unseparated(tags);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder
            .build()
            .execute(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Increment the download counter for a file.
    ///
    /// Returns the new counter value.
    pub async fn increment_downloads(&self, id: i64) -> Result<i64> {
        sqlx::query("UPDATE files SET download_count = download_count + 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        let count: (i64,) = sqlx::query_as("SELECT download_count FROM files WHERE id = ?")
            .bind(id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(count.0)
    }

    /// Delete a file record by ID.
    ///
    /// Returns true if a record was deleted, false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all file records.
    pub async fn count_all(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(count.0)
    }

    /// Total byte size across all records. Zero when the store is empty.
    pub async fn total_size(&self) -> Result<i64> {
        let size: (i64,) = sqlx::query_as("SELECT COALESCE(SUM(size), 0) FROM files")
            .fetch_one(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(size.0)
    }

    /// Record counts grouped by exact content-type string, most common first.
    pub async fn counts_by_mimetype(&self) -> Result<Vec<MimetypeCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT mimetype, COUNT(*) AS count FROM files
             GROUP BY mimetype ORDER BY count DESC, mimetype ASC",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(mimetype, count)| MimetypeCount { mimetype, count })
            .collect())
    }

    /// The most recently created records, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<RecentFile>> {
        let rows: Vec<(String, DateTime<Utc>, i64, String)> = sqlx::query_as(
            "SELECT original_name, created_at, size, mimetype FROM files
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(original_name, created_at, size, mimetype)| RecentFile {
                original_name,
                created_at,
                size,
                mimetype,
            })
            .collect())
    }
}
