use thiserror::Error;

/// Result type for research store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for research store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQL errors, constraint violations
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Storage file manipulation failures
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
