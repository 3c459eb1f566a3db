use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] closebook_core::ValidationError),

    #[error(transparent)]
    Source(#[from] closebook_core::SourceError),

    #[error(transparent)]
    Core(closebook_core::CoreError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<closebook_core::CoreError> for CliError {
    fn from(error: closebook_core::CoreError) -> Self {
        use closebook_core::CoreError;

        match error {
            CoreError::Validation(error) => Self::Validation(error),
            CoreError::Source(error) => Self::Source(error),
            CoreError::Io(error) => Self::Io(error),
            other => Self::Core(other),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Source(_) => 3,
            Self::Serialization(_) => 4,
            Self::Core(_) => 10,
            Self::Io(_) => 10,
        }
    }
}
