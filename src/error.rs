//! Error types for ytdl-helper

use thiserror::Error;

/// Coarse error categories, used to pick how a failure is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // User errors
    InvalidInput,
    RightsRefused,
    InvalidConfig,
    Cancelled,

    // Delegated errors
    ExtractionFailed,
    MissingDependency,

    // System errors
    FileError,
    NetworkError,
    SpawnError,
}

/// Main error type for ytdl-helper
#[derive(Error, Debug)]
pub enum YtdlError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    RightsRefused(String),

    #[error("{0}")]
    Extraction(String),

    #[error("Missing dependency: {0}. Please install it.")]
    MissingDependency(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl YtdlError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::RightsRefused(_) => ErrorCode::RightsRefused,
            Self::Extraction(_) => ErrorCode::ExtractionFailed,
            Self::MissingDependency(_) => ErrorCode::MissingDependency,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::File(_) => ErrorCode::FileError,
            Self::Spawn(_) => ErrorCode::SpawnError,
            Self::Http(_) => ErrorCode::NetworkError,
            Self::Json(_) => ErrorCode::ExtractionFailed,
        }
    }

    /// Process exit code for this error. Every failure exits with 1.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

impl From<dialoguer::Error> for YtdlError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => Self::Cancelled,
            dialoguer::Error::IO(e) => Self::File(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, YtdlError>;
