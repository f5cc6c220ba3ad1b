//! Error types for sightline.

use thiserror::Error;

/// The main error type for sightline operations.
#[derive(Error, Debug)]
pub enum SightlineError {
    /// The scene contains no candidates.
    #[error("scene contains no candidates")]
    EmptyScene,

    /// The viewport has a zero dimension.
    #[error("viewport is zero-sized: {width}x{height}")]
    ZeroViewport { width: u32, height: u32 },

    /// The camera's view-projection matrix cannot be inverted.
    #[error("camera view-projection matrix is not invertible")]
    DegenerateView,

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A grid extent is inverted along some axis.
    #[error("invalid extent {0:?}: min index exceeds max index")]
    InvalidExtent([i32; 6]),

    /// A cell references a point that does not exist.
    #[error("cell {cell} references out-of-range point {point}")]
    InvalidCell { cell: usize, point: u32 },

    /// A cell has fewer points than its kind requires.
    #[error("cell {cell} has {actual} points but its kind requires {expected}")]
    MalformedCell {
        cell: usize,
        expected: usize,
        actual: usize,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for sightline operations.
pub type Result<T> = std::result::Result<T, SightlineError>;
