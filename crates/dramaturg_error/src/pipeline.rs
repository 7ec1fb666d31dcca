//! Pipeline orchestration error types.

/// Conditions that abort a whole pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Pipeline input is missing required fields or malformed
    #[display("Invalid pipeline input: {}", _0)]
    InvalidInput(String),
    /// A station failed outside its own containment boundary
    #[display("Station {} aborted the run: {}", station, message)]
    StageAborted {
        /// Station number (1-7)
        station: u8,
        /// Failure description
        message: String,
    },
}

/// Pipeline error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
