//! Error types for Depot.

use thiserror::Error;

/// Common error type for Depot operations.
#[derive(Error, Debug)]
pub enum DepotError {
    /// Upload rejected because neither the extension nor the declared
    /// content type is allowed.
    #[error("invalid file type: {mimetype}")]
    InvalidFileType {
        /// The rejected content type.
        mimetype: String,
    },

    /// Upload exceeds the configured size ceiling. No bytes are persisted.
    #[error("payload too large: {size} bytes (limit {max})")]
    PayloadTooLarge {
        /// Size of the rejected payload in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        max: u64,
    },

    /// Referenced record does not exist in the metadata store.
    #[error("{0} not found")]
    NotFound(String),

    /// A metadata record exists but its blob is absent from storage.
    ///
    /// Surfaced distinctly from [`DepotError::NotFound`] so operators can
    /// detect store drift.
    #[error("stored file {0} is missing from blob storage")]
    BlobMissing(String),

    /// Metadata store error.
    ///
    /// Wraps errors from the database backend as strings so driver types
    /// never cross the crate boundary.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error from blob storage or the local filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for DepotError {
    fn from(e: sqlx::Error) -> Self {
        DepotError::Database(e.to_string())
    }
}

/// Result type alias for Depot operations.
pub type Result<T> = std::result::Result<T, DepotError>;
