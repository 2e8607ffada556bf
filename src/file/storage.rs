//! Blob storage for Depot.
//!
//! Stores one file per record in a flat directory. Storage filenames are
//! always generated server-side, so paths are simply `{root}/{filename}`.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::{DepotError, Result};

/// Filesystem blob store rooted at a single upload directory.
#[derive(Debug, Clone)]
pub struct BlobStorage {
    root: PathBuf,
}

impl BlobStorage {
    /// Create a new BlobStorage rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        Ok(Self { root })
    }

    /// Get the root directory of this storage.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the full path for a storage filename.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Write content to storage under the given filename.
    ///
    /// The write is flushed to disk before returning, so a crash after a
    /// successful save cannot lose the blob.
    pub async fn save(&self, filename: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(filename);

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;

        Ok(path)
    }

    /// Load blob content from storage.
    ///
    /// A missing blob surfaces as [`DepotError::BlobMissing`]: loads only
    /// happen for filenames that have a metadata record.
    pub async fn load(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.path_for(filename);

        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DepotError::BlobMissing(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a blob from storage.
    ///
    /// Returns `true` if the blob was deleted, `false` if it didn't exist.
    pub async fn delete(&self, filename: &str) -> Result<bool> {
        let path = self.path_for(filename);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a blob exists in storage.
    pub async fn exists(&self, filename: &str) -> bool {
        tokio::fs::metadata(self.path_for(filename)).await.is_ok()
    }
}
