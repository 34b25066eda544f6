use tabula_core::{CallError, CallErrorKind, ConfigError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Validation(_) => 2,
            Self::Call(error) => match error.kind() {
                CallErrorKind::Validation => 2,
                CallErrorKind::Integration => 6,
            },
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
