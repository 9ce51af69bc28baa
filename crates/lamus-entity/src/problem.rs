//! Failures collected while importing files without aborting the batch.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use lamus_core::error::AppError;

/// One file that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProblem {
    /// The offending file.
    pub file: PathBuf,
    /// What went wrong.
    pub message: String,
    /// Rendered cause chain, when the problem came from an error.
    pub cause: Option<String>,
}

impl ImportProblem {
    /// A problem without an underlying error.
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// A problem caused by `error`.
    pub fn from_error(file: impl Into<PathBuf>, message: impl Into<String>, error: &AppError) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
            cause: Some(error.chain()),
        }
    }
}

impl fmt::Display for ImportProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " ({cause})")?;
        }
        Ok(())
    }
}
