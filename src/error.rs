//! Error types for the onboarding service.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Question-catalog loading errors.
///
/// A failed load disables the onboarding feature, never the process. Callers
/// treat `Err` as "no catalog available" and answer with a retryable failure.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Question catalog not found at {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read question catalog at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse question catalog: {0}")]
    Parse(String),

    #[error("Question catalog has no 'questions' array")]
    MissingQuestions,
}

/// Answer-submission validation errors. Surfaced to the caller as a rejected
/// request, never a crash.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("question_id must not be empty")]
    EmptyQuestionId,

    #[error("question_id {id:?} is not a valid question identifier")]
    InvalidQuestionId { id: String },

    #[error("answer value must not be null")]
    MissingValue,
}

/// Session-persistence errors. Surfaced to the caller as retryable failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open session store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Stored session row is corrupt: {0}")]
    Corrupt(String),
}

/// Text-generation errors. Always recovered locally by falling back to the
/// raw question text — these never reach the end user.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
