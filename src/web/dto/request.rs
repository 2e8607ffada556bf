//! Request DTOs for the Web API.

use serde::Deserialize;

use crate::file::TagInput;

/// Query parameters for GET /api/files.
#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    /// Filter by uploader label (exact match).
    pub user: Option<String>,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Sort field (camelCase or snake_case).
    #[serde(default = "default_sort_by", rename = "sortBy")]
    pub sort_by: String,
    /// Sort direction: "asc" or "desc".
    #[serde(default = "default_sort_order", rename = "sortOrder")]
    pub sort_order: String,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

fn default_sort_by() -> String {
    "createdAt".to_string()
}

fn default_sort_order() -> String {
    "desc".to_string()
}

impl Default for ListFilesQuery {
    fn default() -> Self {
        Self {
            user: None,
            page: default_page(),
            limit: default_limit(),
            sort_by: default_sort_by(),
            sort_order: default_sort_order(),
        }
    }
}

/// Body for PUT /api/files/:id.
///
/// All fields are optional; only supplied fields are updated. Tags may be
/// a JSON array or a comma-separated string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    /// New description.
    pub description: Option<String>,
    /// New uploader label.
    pub uploaded_by: Option<String>,
    /// New tags.
    pub tags: Option<TagInput>,
}
