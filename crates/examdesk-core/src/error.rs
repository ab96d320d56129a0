//! Error types for examdesk

use thiserror::Error;

/// Result type alias using ExamDeskError
pub type Result<T> = std::result::Result<T, ExamDeskError>;

/// Error type alias for convenience
pub type Error = ExamDeskError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for examdesk
#[derive(Debug, Error)]
pub enum ExamDeskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No API credentials configured")]
    NotConfigured,

    #[error("All API credentials failed after {attempts} attempt(s): {last_error}")]
    AllCredentialsExhausted { attempts: usize, last_error: String },

    #[error("Credential not found at index {0}")]
    CredentialNotFound(usize),

    #[error("Document not found at position {0}")]
    DocumentNotFound(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ExamDeskError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CredentialNotFound(_) | Self::DocumentNotFound(_) => exit_codes::NOT_FOUND,
            Self::NotConfigured | Self::InvalidInput(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
