//! Web API file tests.
//!
//! Integration tests for the file endpoints, run against the real router
//! with an in-memory metadata store and a temporary upload directory.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::Value;
use tempfile::TempDir;

use depot::web::handlers::AppState;
use depot::web::router::create_router;
use depot::{BlobStorage, Database};

struct TestContext {
    server: TestServer,
    storage: Arc<BlobStorage>,
    _temp_dir: TempDir,
}

/// Create a test server with an in-memory database and a tempdir blob root.
async fn create_test_context_with_limit(max_upload_size: u64) -> TestContext {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = Arc::new(BlobStorage::new(temp_dir.path()).expect("Failed to create storage"));

    let app_state = Arc::new(AppState::new(db, storage.clone(), max_upload_size));
    let router = create_router(app_state, &[]);

    let server = TestServer::new(router).expect("Failed to create test server");

    TestContext {
        server,
        storage,
        _temp_dir: temp_dir,
    }
}

async fn create_test_context() -> TestContext {
    create_test_context_with_limit(1024 * 1024).await
}

/// Upload a file and return the response JSON.
async fn upload_file(
    server: &TestServer,
    name: &str,
    mimetype: &str,
    content: &[u8],
    uploaded_by: Option<&str>,
    tags: Option<&str>,
) -> Value {
    let mut form = MultipartForm::new().add_part(
        "file",
        Part::bytes(content.to_vec())
            .file_name(name.to_string())
            .mime_type(mimetype.to_string()),
    );
    if let Some(uploaded_by) = uploaded_by {
        form = form.add_text("uploadedBy", uploaded_by.to_string());
    }
    if let Some(tags) = tags {
        form = form.add_text("tags", tags.to_string());
    }

    let response = server.post("/api/files/upload").multipart(form).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()
}

fn file_id(upload_response: &Value) -> i64 {
    upload_response["file"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let ctx = create_test_context().await;

    let response = ctx.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_upload_returns_record_without_path() {
    let ctx = create_test_context().await;

    let body = upload_file(
        &ctx.server,
        "a.txt",
        "text/plain",
        b"12345",
        Some("alice"),
        Some("x, y"),
    )
    .await;

    assert_eq!(body["message"], "File uploaded successfully");

    let file = &body["file"];
    assert_eq!(file["originalName"], "a.txt");
    assert_eq!(file["mimetype"], "text/plain");
    assert_eq!(file["size"], 5);
    assert_eq!(file["uploadedBy"], "alice");
    assert_eq!(file["tags"], serde_json::json!(["x", "y"]));
    assert_eq!(file["downloadCount"], 0);
    assert!(file["url"]
        .as_str()
        .unwrap()
        .starts_with("/uploads/"));
    assert!(file.get("path").is_none());
}

#[tokio::test]
async fn test_upload_default_uploader_is_anonymous() {
    let ctx = create_test_context().await;

    let body = upload_file(&ctx.server, "a.txt", "text/plain", b"data", None, None).await;

    assert_eq!(body["file"]["uploadedBy"], "anonymous");
    assert_eq!(body["file"]["description"], "");
    assert!(body["file"]["tags"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_invalid_type() {
    let ctx = create_test_context().await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"MZ".to_vec())
            .file_name("malware.exe")
            .mime_type("application/x-msdownload"),
    );

    let response = ctx.server.post("/api/files/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was persisted: no blob, no record
    assert_eq!(std::fs::read_dir(ctx.storage.root()).unwrap().count(), 0);
    let list = ctx.server.get("/api/files").await.json::<Value>();
    assert_eq!(list["pagination"]["totalFiles"], 0);
}

#[tokio::test]
async fn test_upload_rejects_oversized_payload() {
    let ctx = create_test_context_with_limit(10).await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![0u8; 20])
            .file_name("big.txt")
            .mime_type("text/plain"),
    );

    let response = ctx.server.post("/api/files/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(std::fs::read_dir(ctx.storage.root()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let ctx = create_test_context().await;

    let form = MultipartForm::new().add_text("description", "no file here");

    let response = ctx.server.post("/api/files/upload").multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_same_name_uploads_get_distinct_filenames() {
    let ctx = create_test_context().await;

    let first = upload_file(&ctx.server, "report.pdf", "application/pdf", b"one", None, None).await;
    let second =
        upload_file(&ctx.server, "report.pdf", "application/pdf", b"two", None, None).await;

    assert_ne!(first["file"]["filename"], second["file"]["filename"]);
}

#[tokio::test]
async fn test_get_metadata() {
    let ctx = create_test_context().await;

    let uploaded = upload_file(&ctx.server, "a.txt", "text/plain", b"hello", None, None).await;
    let id = file_id(&uploaded);

    let response = ctx.server.get(&format!("/api/files/{id}")).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["id"], id);
    assert_eq!(body["size"], 5);
    assert!(body.get("path").is_none());
}

#[tokio::test]
async fn test_get_metadata_not_found() {
    let ctx = create_test_context().await;

    let response = ctx.server.get("/api/files/9999").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_download_round_trip_and_count() {
    let ctx = create_test_context().await;

    let content = b"Download test content";
    let uploaded =
        upload_file(&ctx.server, "download.txt", "text/plain", content, None, None).await;
    let id = file_id(&uploaded);

    let response = ctx.server.get(&format!("/api/files/{id}/download")).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), content);

    let headers = response.headers();
    assert_eq!(headers.get("content-type").unwrap(), "text/plain");
    assert_eq!(
        headers.get("content-disposition").unwrap(),
        "attachment; filename=\"download.txt\""
    );

    // Exactly one retrieval, exactly one count
    let metadata = ctx
        .server
        .get(&format!("/api/files/{id}"))
        .await
        .json::<Value>();
    assert_eq!(metadata["downloadCount"], 1);
}

#[tokio::test]
async fn test_download_not_found() {
    let ctx = create_test_context().await;

    let response = ctx.server.get("/api/files/9999/download").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"]["message"], "File not found");
}

#[tokio::test]
async fn test_download_blob_missing_is_distinct_from_not_found() {
    let ctx = create_test_context().await;

    let uploaded = upload_file(&ctx.server, "a.txt", "text/plain", b"data", None, None).await;
    let id = file_id(&uploaded);
    let filename = uploaded["file"]["filename"].as_str().unwrap();

    // Remove the blob behind the store's back
    std::fs::remove_file(ctx.storage.root().join(filename)).unwrap();

    let response = ctx.server.get(&format!("/api/files/{id}/download")).await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "File not found on disk"
    );
}

#[tokio::test]
async fn test_list_filters_by_uploader() {
    let ctx = create_test_context().await;

    upload_file(&ctx.server, "a.txt", "text/plain", b"12345", Some("alice"), Some("x, y")).await;
    upload_file(&ctx.server, "b.txt", "text/plain", b"other", Some("bob"), None).await;

    let response = ctx.server.get("/api/files").add_query_param("user", "alice").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();

    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["uploadedBy"], "alice");
    assert_eq!(files[0]["size"], 5);
    assert_eq!(files[0]["tags"], serde_json::json!(["x", "y"]));
    assert_eq!(body["pagination"]["totalFiles"], 1);
}

#[tokio::test]
async fn test_list_pagination() {
    let ctx = create_test_context().await;

    for n in 1..=5 {
        upload_file(
            &ctx.server,
            &format!("file{n}.txt"),
            "text/plain",
            b"data",
            None,
            None,
        )
        .await;
    }

    let response = ctx
        .server
        .get("/api/files")
        .add_query_param("page", "3")
        .add_query_param("limit", "2")
        .await;

    let body = response.json::<Value>();

    assert_eq!(body["files"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["current"], 3);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["count"], 1);
    assert_eq!(body["pagination"]["totalFiles"], 5);
}

#[tokio::test]
async fn test_list_sorting() {
    let ctx = create_test_context().await;

    upload_file(&ctx.server, "big.txt", "text/plain", &[0u8; 100], None, None).await;
    upload_file(&ctx.server, "small.txt", "text/plain", &[0u8; 10], None, None).await;

    let response = ctx
        .server
        .get("/api/files")
        .add_query_param("sortBy", "size")
        .add_query_param("sortOrder", "asc")
        .await;

    let body = response.json::<Value>();
    let files = body["files"].as_array().unwrap();

    assert_eq!(files[0]["originalName"], "small.txt");
    assert_eq!(files[1]["originalName"], "big.txt");
}

#[tokio::test]
async fn test_list_default_is_newest_first() {
    let ctx = create_test_context().await;

    upload_file(&ctx.server, "first.txt", "text/plain", b"1", None, None).await;
    upload_file(&ctx.server, "second.txt", "text/plain", b"2", None, None).await;

    let body = ctx.server.get("/api/files").await.json::<Value>();
    let files = body["files"].as_array().unwrap();

    assert_eq!(files[0]["originalName"], "second.txt");
    assert_eq!(files[1]["originalName"], "first.txt");
}

#[tokio::test]
async fn test_update_metadata_partial() {
    let ctx = create_test_context().await;

    let uploaded = upload_file(
        &ctx.server,
        "a.txt",
        "text/plain",
        b"data",
        Some("alice"),
        None,
    )
    .await;
    let id = file_id(&uploaded);

    let response = ctx
        .server
        .put(&format!("/api/files/{id}"))
        .json(&serde_json::json!({
            "description": "updated description",
            "tags": "red, blue"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();

    assert_eq!(body["message"], "File updated successfully");
    assert_eq!(body["file"]["description"], "updated description");
    assert_eq!(body["file"]["tags"], serde_json::json!(["red", "blue"]));
    // Unsupplied fields are untouched
    assert_eq!(body["file"]["uploadedBy"], "alice");
}

#[tokio::test]
async fn test_update_metadata_tags_as_array() {
    let ctx = create_test_context().await;

    let uploaded = upload_file(&ctx.server, "a.txt", "text/plain", b"data", None, None).await;
    let id = file_id(&uploaded);

    let response = ctx
        .server
        .put(&format!("/api/files/{id}"))
        .json(&serde_json::json!({ "tags": ["a", "b"] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>()["file"]["tags"],
        serde_json::json!(["a", "b"])
    );
}

#[tokio::test]
async fn test_update_metadata_not_found() {
    let ctx = create_test_context().await;

    let response = ctx
        .server
        .put("/api/files/9999")
        .json(&serde_json::json!({ "description": "x" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_removes_blob_and_record() {
    let ctx = create_test_context().await;

    let uploaded = upload_file(&ctx.server, "a.txt", "text/plain", b"data", None, None).await;
    let id = file_id(&uploaded);
    let filename = uploaded["file"]["filename"].as_str().unwrap().to_string();

    let response = ctx.server.delete(&format!("/api/files/{id}")).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>()["message"],
        "File deleted successfully"
    );

    // Both stores are clean
    assert!(!ctx.storage.root().join(&filename).exists());
    let metadata = ctx.server.get(&format!("/api/files/{id}")).await;
    assert_eq!(metadata.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_twice_returns_not_found() {
    let ctx = create_test_context().await;

    let uploaded = upload_file(&ctx.server, "a.txt", "text/plain", b"data", None, None).await;
    let id = file_id(&uploaded);

    let first = ctx.server.delete(&format!("/api/files/{id}")).await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let second = ctx.server.delete(&format!("/api/files/{id}")).await;
    assert_eq!(second.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_empty_store() {
    let ctx = create_test_context().await;

    let response = ctx.server.get("/api/files/stats/summary").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();

    assert_eq!(body["totalFiles"], 0);
    assert_eq!(body["totalSize"], 0);
    assert!(body["fileTypes"].as_array().unwrap().is_empty());
    assert!(body["recentFiles"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_stats_after_uploads() {
    let ctx = create_test_context().await;

    upload_file(&ctx.server, "a.txt", "text/plain", b"12345", None, None).await;
    upload_file(&ctx.server, "b.txt", "text/plain", b"123", None, None).await;
    upload_file(&ctx.server, "c.pdf", "application/pdf", b"12", None, None).await;

    let body = ctx
        .server
        .get("/api/files/stats/summary")
        .await
        .json::<Value>();

    assert_eq!(body["totalFiles"], 3);
    assert_eq!(body["totalSize"], 10);

    let file_types = body["fileTypes"].as_array().unwrap();
    assert_eq!(file_types[0]["mimetype"], "text/plain");
    assert_eq!(file_types[0]["count"], 2);
    assert_eq!(file_types[1]["mimetype"], "application/pdf");
    assert_eq!(file_types[1]["count"], 1);

    let recent = body["recentFiles"].as_array().unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0]["originalName"], "c.pdf");
    assert!(recent[0].get("path").is_none());
    assert!(recent[0].get("downloadCount").is_none());
}
