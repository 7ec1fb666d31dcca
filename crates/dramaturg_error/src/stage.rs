//! Station-level error types.

/// Failure conditions inside a single analysis station.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StageErrorKind {
    /// Input validator rejected the station input
    #[display("Invalid input: {}", _0)]
    InvalidInput(String),
    /// Output validator rejected the station output
    #[display("Invalid output: {}", _0)]
    InvalidOutput(String),
    /// A collaborator (model client, store) failed
    #[display("Upstream failure: {}", _0)]
    Upstream(String),
    /// Station logic could not produce a result
    #[display("Processing failed: {}", _0)]
    Processing(String),
}

/// Station error with location tracking.
///
/// # Examples
///
/// ```
/// use dramaturg_error::{StageError, StageErrorKind};
///
/// let err = StageError::new(StageErrorKind::InvalidInput("empty text".into()));
/// assert!(format!("{}", err).contains("Invalid input"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Stage Error: {} at line {} in {}", kind, line, file)]
pub struct StageError {
    /// The specific error condition
    pub kind: StageErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl StageError {
    /// Create a new StageError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a processing failure.
    #[track_caller]
    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(StageErrorKind::Processing(message.into()))
    }
}

impl From<crate::DramaturgError> for StageError {
    #[track_caller]
    fn from(err: crate::DramaturgError) -> Self {
        Self::new(StageErrorKind::Upstream(err.to_string()))
    }
}
