//! File handlers for the Web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::{FileService, ListQuery, TagInput, UploadRequest};
use crate::web::dto::{
    FileResponse, ListFilesQuery, ListFilesResponse, MessageResponse, PaginationMeta,
    StatsResponse, UpdateFileRequest, UpdateResponse, UploadResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

fn file_service(state: &AppState) -> FileService<'_> {
    FileService::new(&state.db, &state.storage).with_max_upload_size(state.max_upload_size)
}

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are removed (CR/LF would allow header injection),
/// quotes and backslashes are replaced in the ASCII fallback, and
/// non-ASCII names get an RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// GET /api/files - List files with filtering, sorting, and pagination.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ListFilesResponse>, ApiError> {
    let service = file_service(&state);

    let mut list_query = ListQuery::new()
        .page(query.page)
        .per_page(query.limit.clamp(1, 500));
    if let Some(user) = query.user {
        list_query = list_query.uploaded_by(user);
    }
    // Unknown sort parameters fall back to the defaults
    list_query.sort = query.sort_by.parse().unwrap_or_default();
    list_query.order = query.sort_order.parse().unwrap_or_default();

    let (files, total) = service.list(&list_query).await?;

    let per_page = list_query.per_page.max(1) as i64;
    let total_pages = ((total + per_page - 1) / per_page) as u32;

    let files: Vec<FileResponse> = files.into_iter().map(Into::into).collect();
    let count = files.len();

    Ok(Json(ListFilesResponse {
        files,
        pagination: PaginationMeta {
            current: list_query.page.max(1),
            total: total_pages,
            count,
            total_files: total,
        },
    }))
}

/// POST /api/files/upload - Upload a file.
///
/// Multipart form with a required "file" field and optional "uploadedBy",
/// "description", and "tags" (comma-separated) fields.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut original_name: Option<String> = None;
    let mut mimetype: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut uploaded_by: Option<String> = None;
    let mut description: Option<String> = None;
    let mut tags: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                original_name = field.file_name().map(|s| s.to_string());
                mimetype = field.content_type().map(|s| s.to_string());
                content = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            tracing::error!("Failed to read file content: {}", e);
                            ApiError::bad_request("Failed to read file")
                        })?
                        .to_vec(),
                );
            }
            "uploadedBy" => {
                uploaded_by = Some(read_text_field(field).await?);
            }
            "description" => {
                description = Some(read_text_field(field).await?);
            }
            "tags" => {
                tags = Some(read_text_field(field).await?);
            }
            _ => {}
        }
    }

    let original_name = original_name.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let content = content.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    // Fall back to a guess from the filename when the client sent no type
    let mimetype = mimetype.unwrap_or_else(|| {
        mime_guess::from_path(&original_name)
            .first_or_octet_stream()
            .to_string()
    });

    let mut request = UploadRequest::new(original_name, mimetype, content);
    if let Some(uploaded_by) = uploaded_by {
        request = request.with_uploaded_by(uploaded_by);
    }
    if let Some(description) = description {
        request = request.with_description(description);
    }
    if let Some(tags) = tags {
        request = request.with_tags(TagInput::Text(tags));
    }

    let service = file_service(&state);
    let record = service.ingest(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            file: record.into(),
        }),
    ))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })
}

/// GET /api/files/:id - Get file metadata.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Json<FileResponse>, ApiError> {
    let service = file_service(&state);
    let record = service.get_metadata(file_id).await?;

    Ok(Json(record.into()))
}

/// GET /api/files/:id/download - Download a file.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let service = file_service(&state);
    let result = service.download(file_id).await?;

    let response = Response::builder()
        .header(header::CONTENT_TYPE, result.record.mimetype.clone())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&result.record.original_name),
        )
        .header(header::CONTENT_LENGTH, result.content.len())
        .body(Body::from(result.content))
        .map_err(|e| {
            tracing::error!("Failed to build download response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

/// PUT /api/files/:id - Update file metadata.
pub async fn update_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
    Json(body): Json<UpdateFileRequest>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let service = file_service(&state);
    let record = service
        .update_metadata(file_id, body.description, body.uploaded_by, body.tags)
        .await?;

    Ok(Json(UpdateResponse {
        message: "File updated successfully".to_string(),
        file: record.into(),
    }))
}

/// DELETE /api/files/:id - Delete a file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let service = file_service(&state);
    service.delete(file_id).await?;

    Ok(Json(MessageResponse {
        message: "File deleted successfully".to_string(),
    }))
}

/// GET /api/files/stats/summary - Get file statistics.
pub async fn stats_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatsResponse>, ApiError> {
    let service = file_service(&state);
    let stats = service.summarize().await?;

    Ok(Json(stats.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_header_simple_ascii() {
        let result = content_disposition_header("document.txt");
        assert_eq!(result, "attachment; filename=\"document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_with_spaces() {
        let result = content_disposition_header("my document.txt");
        assert_eq!(result, "attachment; filename=\"my document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_non_ascii() {
        let result = content_disposition_header("日本語ファイル.txt");
        assert!(result.starts_with("attachment; filename=\""));
        assert!(result.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_content_disposition_header_double_quote() {
        let result = content_disposition_header("test\"file.txt");
        assert!(result.contains("filename=\"test_file.txt\""));
        assert!(result.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_content_disposition_header_header_injection() {
        let result = content_disposition_header("test\r\nX-Injected: bad.txt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("attachment; filename="));
    }
}
