//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("failed to read manifest file {path}: {message}")]
    ManifestLoad { path: PathBuf, message: String },

    #[error("failed to load script {path}: {source}")]
    ScriptLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list functions for command {command}: {source}")]
    Introspection {
        command: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unknown command \"{0}\"")]
    CommandNotFound(String),

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
