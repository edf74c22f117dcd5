//! Error types for carousel operations.

use thiserror::Error;

/// Result type for carousel operations.
pub type CarouselResult<T> = Result<T, CarouselError>;

/// Errors reported by [`crate::EditorState::try_dispatch`] and the exporters.
///
/// A rejected action leaves the state unchanged either way; plain
/// `dispatch` only logs the rejection.
#[derive(Debug, Error)]
pub enum CarouselError {
    /// Slide not found in the document.
    #[error("Slide not found: {0}")]
    SlideNotFound(String),

    /// Element not found on a slide.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Invalid document operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
