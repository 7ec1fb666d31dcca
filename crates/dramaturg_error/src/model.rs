//! Generative backend error types.

/// Error conditions raised while talking to a text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ModelErrorKind {
    /// API key not found in environment
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Failed to create a backend client
    #[display("Failed to create model client: {}", _0)]
    ClientCreation(String),
    /// API request failed
    #[display("Model request failed: {}", _0)]
    ApiRequest(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// The call did not complete within the configured timeout
    #[display("Request to {} timed out after {}s", model, seconds)]
    Timeout {
        /// Model identifier
        model: String,
        /// Timeout in seconds
        seconds: u64,
    },
    /// The backend answered with no text
    #[display("Model {} returned an empty response", _0)]
    EmptyResponse(String),
}

impl ModelErrorKind {
    /// Whether the condition is transient on the remote side.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelErrorKind::HttpError { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            ModelErrorKind::Timeout { .. } | ModelErrorKind::EmptyResponse(_) => true,
            _ => false,
        }
    }
}

/// Backend error with source location tracking.
///
/// # Examples
///
/// ```
/// use dramaturg_error::{ModelError, ModelErrorKind};
///
/// let err = ModelError::new(ModelErrorKind::HttpError {
///     status_code: 503,
///     message: "overloaded".into(),
/// });
/// assert!(err.kind.is_transient());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Model Error: {} at line {} in {}", kind, line, file)]
pub struct ModelError {
    /// The specific error condition
    pub kind: ModelErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ModelError {
    /// Create a new ModelError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ModelErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
