//! CLI error types

use thiserror::Error;

use crate::store::StoreError;

/// Result type for CLI commands
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced to the command line
#[derive(Debug, Error)]
pub enum CliError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
