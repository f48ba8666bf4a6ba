/*!
 * Error types for the doctranslate application.
 *
 * Unit-level translation failures are modelled by `BackendError` and are
 * always recovered by falling back to the source text. Structural failures
 * (load, save, rebuild) are modelled by `DocumentError` and abort the run.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Whether a backend failure is worth another attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient failure (timeouts, rate limits, 5xx, connection drops)
    Retryable,
    /// Permanent failure (authentication, malformed request)
    NonRetryable,
}

/// Errors that can occur when calling a translation backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The response could not be parsed or did not match the request
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request itself was rejected as invalid
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// Classify this error for the retry controller
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ConnectionError(_)
            | Self::Timeout(_)
            | Self::RateLimitExceeded(_)
            | Self::MalformedResponse(_) => ErrorClass::Retryable,
            Self::ApiError { status_code, .. } if *status_code >= 500 => ErrorClass::Retryable,
            Self::ApiError { .. } | Self::AuthenticationError(_) | Self::InvalidRequest(_) => {
                ErrorClass::NonRetryable
            }
        }
    }

    /// Shorthand for `class() == ErrorClass::Retryable`
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Retryable
    }

    /// Map a non-success HTTP status and its body to an error
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            408 => Self::Timeout(message),
            429 => Self::RateLimitExceeded(message),
            400..=499 => Self::InvalidRequest(format!("{} - {}", status_code, message)),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_decode() {
            Self::MalformedResponse(error.to_string())
        } else if let Some(status) = error.status() {
            Self::from_status(status.as_u16(), error.to_string())
        } else if error.is_builder() {
            Self::InvalidRequest(error.to_string())
        } else {
            Self::ConnectionError(error.to_string())
        }
    }
}

/// Structural errors: any of these aborts the run and no output is written
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The input could not be read or decoded into a document
    #[error("Failed to load document {path:?}: {message}")]
    Load {
        /// Input path
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// The output could not be encoded or written
    #[error("Failed to save document {path:?}: {message}")]
    Save {
        /// Output path
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// Translated units do not line up with the document structure
    #[error("Rebuild invariant violated: {0}")]
    RebuildInvariant(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a backend that escaped the fallback path
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Error loading, rebuilding or saving a document
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Document(DocumentError::Load { .. }) => 3,
            Self::Document(DocumentError::Save { .. }) => 4,
            Self::Document(DocumentError::RebuildInvariant(_)) => 5,
            Self::File(_) | Self::Backend(_) | Self::Unknown(_) => 1,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // Keep the typed error when one is buried under context
        let error = match error.downcast::<DocumentError>() {
            Ok(document_error) => return Self::Document(document_error),
            Err(error) => error,
        };
        let error = match error.downcast::<BackendError>() {
            Ok(backend_error) => return Self::Backend(backend_error),
            Err(error) => error,
        };
        match error.downcast::<std::io::Error>() {
            Ok(io_error) => Self::File(io_error.to_string()),
            Err(error) => Self::Unknown(format!("{:#}", error)),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
