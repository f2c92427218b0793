use thiserror::Error;

/// Boxed error reported by raster sources and coordinate transforms.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can abort a vectorization run.
#[derive(Debug, Error)]
pub enum VectorizeError {
    #[cfg(feature = "ndarray")]
    #[error(transparent)]
    NdarrayShapeError(#[from] ndarray::ShapeError),
    #[error("Sample value {value} does not fall in any class range")]
    ValueOutOfRange { value: f64 },
    #[error("Boundary for row {row}, column {column} has no edges")]
    EmptyBoundary { row: usize, column: usize },
    #[error("Frontier is inconsistent at row {row}, vertex {column}: {msg}")]
    BrokenFrontier {
        row: usize,
        column: usize,
        msg: &'static str,
    },
    #[error("Failed to read raster row {row}")]
    SourceRead {
        row: usize,
        #[source]
        source: BoxError,
    },
    #[error("Failed to transform grid coordinate ({x}, {y})")]
    Transform {
        x: f64,
        y: f64,
        #[source]
        source: BoxError,
    },
    #[error("Vectorization cancelled after row {row}")]
    Cancelled { row: usize },
    #[error("Bad argument: {0}")]
    BadArgument(String),
}

pub type Result<T> = std::result::Result<T, VectorizeError>;
