//! Error types for kjarni-blas.

use thiserror::Error;

/// Errors reported by the gemv drivers and the config layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlasError {
    /// A BLAS argument failed validation. `position` is the 1-based parameter
    /// index of the column-major reference interface.
    #[error("Invalid argument #{position} ('{name}'): {reason}")]
    InvalidArgument {
        position: usize,
        name: &'static str,
        reason: String,
    },

    /// A buffer is shorter than the operand it is described to hold.
    #[error("Buffer '{name}' too small: need {required} elements, got {actual}")]
    BufferTooSmall {
        name: &'static str,
        required: usize,
        actual: usize,
    },

    /// Array operands whose shapes do not line up.
    #[error("Shape mismatch for '{name}': expected {expected}, got {actual}")]
    ShapeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Unrecognised kernel name in config or environment.
    #[error("Unknown kernel '{0}'. Expected one of: auto, scalar, portable, native")]
    UnknownKernel(String),
}

/// Result type for kjarni-blas operations.
pub type BlasResult<T> = Result<T, BlasError>;

impl BlasError {
    pub(crate) fn invalid(position: usize, name: &'static str, reason: impl Into<String>) -> Self {
        BlasError::InvalidArgument {
            position,
            name,
            reason: reason.into(),
        }
    }
}
