//! Convenience result type alias for PhaseHub.

use crate::error::AppError;

/// A specialized `Result` type for PhaseHub operations.
pub type AppResult<T> = Result<T, AppError>;
