use thiserror::Error;

/// Result type alias using [GridError]
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors raised while building grid spaces or combining their elements.
///
/// All of these are detected at the operation boundary and returned to the caller;
/// nothing is coerced or substituted.
#[derive(Error, Debug)]
pub enum GridError {
    /// Operands reference different `GridSpace` instances
    #[error("operands belong to different grid spaces")]
    IncompatibleSpace,

    /// Axis number outside `1..=dim`
    #[error("axis {axis} is outside 1..={dim}")]
    InvalidAxis { axis: usize, dim: usize },

    /// Vector or matrix size does not match the number of grid points
    #[error("expected {expected} values, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Direct indexing beyond the storage extent
    #[error("index {index:?} is outside storage of extent {extent:?}")]
    OutOfBounds { index: Vec<usize>, extent: Vec<usize> },

    /// The mesh axis with this number (counting from 1) was given zero points
    #[error("mesh axis {0} has no points")]
    EmptyAxis(usize),

    /// Malformed mesh description
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// Copying stored values between matrices with different sparsity patterns
    #[error("sparsity patterns differ; cannot copy stored values")]
    PatternMismatch,

    #[error("sparse format error: {0}")]
    SparseFormat(#[from] nalgebra_sparse::SparseFormatError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse mesh file as JSON: {0}")]
    Json(#[from] json::Error),
}
