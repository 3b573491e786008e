use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Error during file I/O operations
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization
    #[error("json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    /// Error when user input fails.
    #[error("inquire error: {0}")]
    Inquire(#[from] inquire::InquireError),
    /// Error when a managed block pattern cannot be compiled
    #[error("block pattern error: {0}")]
    Regex(#[from] regex::Error),
    /// Error when an external command exits unsuccessfully
    #[error("command failed: {0}")]
    Command(String),
    /// Error when a profile id is not in the registry.
    #[error("profile not found: '{0}'")]
    ProfileNotFound(String),
    /// Error when a mapping id or path is not in the registry.
    #[error("mapping not found: '{0}'")]
    MappingNotFound(String),
    /// Error when a request contradicts existing state (e.g. foreign remote host).
    #[error("{0}")]
    Conflict(String),
    /// Error during input validation.
    #[error("validation error: {0}")]
    Validation(String),
    /// Error during UTF-8 conversion.
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
}

/// Result alias used throughout the crate
pub type Result<T, E = AppError> = std::result::Result<T, E>;
