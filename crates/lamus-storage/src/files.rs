//! Workspace file handling on the local filesystem.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use lamus_core::error::{AppError, ErrorKind};
use lamus_core::result::AppResult;
use lamus_core::traits::{MetadataApi, MetadataDocument};

/// Writes workspace files and enumerates directories.
#[async_trait]
pub trait WorkspaceFileHandler: Send + Sync + std::fmt::Debug + 'static {
    /// Create a directory and its missing parents.
    async fn create_directory(&self, dir: &Path) -> AppResult<()>;

    /// Serialize `document` and write it to `target`, creating parent directories.
    async fn write_document(&self, document: &MetadataDocument, target: &Path) -> AppResult<()>;

    /// All regular files below `dir`, sorted. A missing directory has no files.
    async fn list_files(&self, dir: &Path) -> AppResult<Vec<PathBuf>>;
}

/// [`WorkspaceFileHandler`] backed by `tokio::fs`.
#[derive(Debug, Clone)]
pub struct LocalWorkspaceFiles {
    metadata: Arc<dyn MetadataApi>,
}

impl LocalWorkspaceFiles {
    /// Create a handler that serializes documents through `metadata`.
    pub fn new(metadata: Arc<dyn MetadataApi>) -> Self {
        Self { metadata }
    }
}

#[async_trait]
impl WorkspaceFileHandler for LocalWorkspaceFiles {
    async fn create_directory(&self, dir: &Path) -> AppResult<()> {
        fs::create_dir_all(dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory: {}", dir.display()),
                e,
            )
        })
    }

    async fn write_document(&self, document: &MetadataDocument, target: &Path) -> AppResult<()> {
        let data = self.metadata.serialize_document(document)?;

        if let Some(parent) = target.parent() {
            self.create_directory(parent).await?;
        }
        fs::write(target, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write document: {}", target.display()),
                e,
            )
        })?;

        debug!(path = %target.display(), bytes = data.len(), "Wrote metadata document");
        Ok(())
    }

    async fn list_files(&self, dir: &Path) -> AppResult<Vec<PathBuf>> {
        if !fs::try_exists(dir).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            let mut entries = fs::read_dir(&current).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to list directory: {}", current.display()),
                    e,
                )
            })?;

            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
            })? {
                let file_type = entry.file_type().await.map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to get entry type", e)
                })?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }
        }

        files.sort();
        Ok(files)
    }
}
