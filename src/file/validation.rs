//! Upload validation policy.

use std::path::Path;

use crate::{DepotError, Result};

/// Filename extensions accepted by default (case-insensitive).
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "jpeg", "jpg", "png", "gif", "pdf", "doc", "docx", "txt", "csv", "xlsx", "xls", "zip", "json",
    "xml", "log",
];

/// Declared content types accepted by default.
///
/// Any `text/*` type is accepted regardless of this list.
pub const DEFAULT_ALLOWED_MIMETYPES: &[&str] = &[
    "text/plain",
    "text/csv",
    "application/json",
    "application/pdf",
    "application/zip",
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Accept/reject policy for incoming uploads.
///
/// Decisions are made from the original filename and the declared content
/// type, before any bytes are persisted.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed_extensions: Vec<String>,
    allowed_mimetypes: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_ALLOWED_MIMETYPES)
    }
}

impl UploadPolicy {
    /// Create a policy from explicit allow-lists.
    pub fn new<S: AsRef<str>>(extensions: &[S], mimetypes: &[S]) -> Self {
        Self {
            allowed_extensions: extensions
                .iter()
                .map(|e| e.as_ref().to_lowercase())
                .collect(),
            allowed_mimetypes: mimetypes.iter().map(|m| m.as_ref().to_string()).collect(),
        }
    }

    /// Check a candidate upload against the policy.
    ///
    /// Accepts if the filename extension is allow-listed (case-insensitive),
    /// or the declared content type is allow-listed, or the content type's
    /// top-level type is `text`.
    pub fn check(&self, original_name: &str, mimetype: &str) -> Result<()> {
        let ext_allowed = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .map(|e| self.allowed_extensions.iter().any(|a| *a == e))
            .unwrap_or(false);

        let mime_allowed =
            self.allowed_mimetypes.iter().any(|a| a == mimetype) || mimetype.starts_with("text/");

        if ext_allowed || mime_allowed {
            Ok(())
        } else {
            Err(DepotError::InvalidFileType {
                mimetype: mimetype.to_string(),
            })
        }
    }

    /// Check an upload size against a ceiling.
    pub fn check_size(&self, size: u64, max: u64) -> Result<()> {
        if size > max {
            Err(DepotError::PayloadTooLarge { size, max })
        } else {
            Ok(())
        }
    }
}
