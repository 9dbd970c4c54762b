//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::Domain(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Spawn { .. } | InfraError::Interpreter { .. } => exitcode::SOFTWARE,
                InfraError::Application(e) => application_exit_code(e),
            },
        }
    }

    /// The routed command does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CliError::Infra(InfraError::Application(ApplicationError::CommandNotFound(_)))
        )
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::ManifestLoad { .. } => exitcode::CONFIG,
        ApplicationError::CommandNotFound(_) => exitcode::NOT_FOUND,
        ApplicationError::ScriptLoad { .. }
        | ApplicationError::Introspection { .. }
        | ApplicationError::OperationFailed { .. } => exitcode::SOFTWARE,
        ApplicationError::Domain(d) => match d {
            DomainError::UnknownOption(_)
            | DomainError::InvalidOptionValue { .. }
            | DomainError::MissingOptionValue(_) => exitcode::USAGE,
            DomainError::DuplicateOption { .. }
            | DomainError::InvalidShortName(_)
            | DomainError::InvalidSeparator
            | DomainError::DuplicateCommand(_) => exitcode::CONFIG,
            DomainError::AlreadyParsed(_) => exitcode::SOFTWARE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes_follow_sysexits() {
        let manifest: CliError = ApplicationError::ManifestLoad {
            path: PathBuf::from("centry.yaml"),
            message: "missing".into(),
        }
        .into();
        assert_eq!(manifest.exit_code(), exitcode::CONFIG);

        let unknown: CliError = DomainError::UnknownOption("--nope".into()).into();
        assert_eq!(unknown.exit_code(), exitcode::USAGE);

        let not_found: CliError = ApplicationError::CommandNotFound("nope".into()).into();
        assert_eq!(not_found.exit_code(), exitcode::NOT_FOUND);
        assert!(not_found.is_not_found());

        let duplicate: CliError = DomainError::DuplicateCommand("get".into()).into();
        assert_eq!(duplicate.exit_code(), exitcode::CONFIG);
    }
}
