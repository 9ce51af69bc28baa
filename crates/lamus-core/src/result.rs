//! Convenience result type alias for LAMUS.

use crate::error::AppError;

/// A specialized `Result` type for LAMUS operations.
pub type AppResult<T> = Result<T, AppError>;
