//! S3 backend error types.

use thiserror::Error;

/// Result type for backend setup.
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors raised while building the S3 backend.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
