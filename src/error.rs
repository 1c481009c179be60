use thiserror::Error;

/// Top-level error type for the sfgeom kernel.
#[derive(Debug, Error)]
pub enum SfgeomError {
    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors raised by the exact number kernel and coordinate access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("non-finite value {0} cannot be converted to an exact number")]
    NonFiniteValue(f64),

    #[error("invalid comparison: {0}")]
    InvalidComparison(String),
}

/// Errors related to geometry preconditions.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid geometry: {0}")]
    Invalid(String),

    #[error("cannot build a consistent orientation: {0}")]
    OrientationConflict(String),
}

/// Errors related to algorithm dispatch.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors related to triangulation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("triangulation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`SfgeomError`].
pub type Result<T> = std::result::Result<T, SfgeomError>;
