//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::ErrorKind;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(d) => match d.kind() {
                        ErrorKind::Integrity | ErrorKind::Cycle | ErrorKind::Format => {
                            crate::exitcode::DATAERR
                        }
                    },
                    ApplicationError::Json { .. } | ApplicationError::TooDeep { .. } => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::InputNotFound(_) => crate::exitcode::NOINPUT,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use std::path::PathBuf;

    #[test]
    fn given_domain_errors_when_mapping_then_data_error() {
        let cycle: CliError = ApplicationError::from(DomainError::CycleDetected("1".into())).into();
        assert_eq!(cycle.exit_code(), crate::exitcode::DATAERR);

        let dangling: CliError = ApplicationError::from(DomainError::DanglingParent {
            id: "2".into(),
            parent: "9".into(),
        })
        .into();
        assert_eq!(dangling.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_input_when_mapping_then_no_input() {
        let err: CliError = ApplicationError::InputNotFound(PathBuf::from("rows.json")).into();
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
        assert_eq!(err.to_string(), "input not found: rows.json");
    }

    #[test]
    fn given_usage_and_config_errors_when_mapping_then_distinct_codes() {
        assert_eq!(
            CliError::Usage("no command".into()).exit_code(),
            crate::exitcode::USAGE
        );
        let config: CliError = ApplicationError::Config {
            message: "bad".into(),
        }
        .into();
        assert_eq!(config.exit_code(), crate::exitcode::CONFIG);
        let io = CliError::from(InfraError::io(
            "read stdin",
            std::io::Error::from(std::io::ErrorKind::BrokenPipe),
        ));
        assert_eq!(io.exit_code(), crate::exitcode::IOERR);
    }
}
