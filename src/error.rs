use thiserror::Error;

/// Errors raised while building or accessing sampled fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("Attempt to access value outside range: ({row}, {col}) in a {rows}x{cols} field")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Buffer holds {actual} samples, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Field extents must be at least 1x1, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("Pixel pitch must be finite and positive, got ({x}, {y})")]
    InvalidPitch { x: f64, y: f64 },

    #[error("Scale must be finite and positive, got {0}")]
    InvalidScale(f64),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}
