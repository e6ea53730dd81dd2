use thiserror::Error;

// Unified error type for xpose

#[derive(Error, Debug)]
pub enum XError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("matrix is not square ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },
    #[error("buffer length mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("verification failed: {0}")]
    Verification(String),
    #[error("communication error: {0}")]
    Comm(String),
    #[cfg(feature = "rayon")]
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}
