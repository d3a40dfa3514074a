//! Convenience result type alias for Busway.

use crate::error::AppError;

/// A specialized `Result` type for Busway operations.
pub type AppResult<T> = Result<T, AppError>;
