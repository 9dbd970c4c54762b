//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of option and command-table rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("option already defined in {scope} scope: {name}")]
    DuplicateOption { scope: String, name: String },

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("invalid value for option {name}: {value}")]
    InvalidOptionValue { name: String, value: String },

    #[error("option requires a value: {0}")]
    MissingOptionValue(String),

    #[error("short name must be a single character: {0}")]
    InvalidShortName(String),

    #[error("options already parsed for {0} scope")]
    AlreadyParsed(String),

    #[error("namespace separator must not be empty")]
    InvalidSeparator,

    #[error("command registered twice: {0}")]
    DuplicateCommand(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
