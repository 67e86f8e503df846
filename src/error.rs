//! Error types for the anofox-trend library.

use thiserror::Error;

/// Result type alias for modeling operations.
pub type Result<T> = std::result::Result<T, TrendError>;

/// Errors that can occur while building series or computing models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrendError {
    /// Malformed parameter or argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation invoked in a state that does not allow it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The source series contains no points.
    #[error("series is empty")]
    EmptySeries,

    /// Window size exceeds the number of available points.
    #[error("window size {window} exceeds series length {len}")]
    WindowTooLarge { window: usize, len: usize },

    /// Not enough distinct observations to determine the model.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Dimension mismatch between aligned arrays.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Numerical failure (e.g. singular system).
    #[error("computation error: {0}")]
    ComputationError(String),
}

impl TrendError {
    /// Whether the error stems from parameters that are individually valid
    /// but infeasible against the data.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            TrendError::EmptySeries
                | TrendError::WindowTooLarge { .. }
                | TrendError::InsufficientData { .. }
        )
    }
}
