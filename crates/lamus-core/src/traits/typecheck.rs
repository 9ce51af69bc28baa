//! File type checker trait.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// The type checker's classification of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypecheckVerdict {
    /// Detected mimetype.
    pub mimetype: String,
    /// Whether the archive accepts files of this type.
    pub archivable: bool,
    /// Human-readable explanation from the checker.
    pub message: String,
}

/// Classifies files by content.
#[async_trait]
pub trait TypeChecker: Send + Sync + std::fmt::Debug + 'static {
    /// Check the file at `path`. `declared` is the mimetype the caller expects.
    async fn check(&self, path: &Path, declared: Option<&str>) -> AppResult<TypecheckVerdict>;
}
