//! Top-level error wrapper types.

use crate::{
    ConfigError, ModelError, NetworkError, PipelineError, StageError, StorageError,
};

/// Every error condition the workspace can surface.
///
/// # Examples
///
/// ```
/// use dramaturg_error::{DramaturgError, ConfigError};
///
/// let err: DramaturgError = ConfigError::new("bad tier").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum DramaturgErrorKind {
    /// Generative backend error
    #[from(ModelError)]
    Model(ModelError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Conflict network invariant violation
    #[from(NetworkError)]
    Network(NetworkError),
    /// Station failure
    #[from(StageError)]
    Stage(StageError),
    /// Pipeline abort
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Artifact storage error
    #[from(StorageError)]
    Storage(StorageError),
}

/// Dramaturg error with kind discrimination.
///
/// # Examples
///
/// ```
/// use dramaturg_error::{DramaturgErrorKind, DramaturgResult, PipelineError, PipelineErrorKind};
///
/// fn run() -> DramaturgResult<()> {
///     Err(PipelineError::new(PipelineErrorKind::InvalidInput("fullText is required".into())))?
/// }
///
/// let err = run().unwrap_err();
/// assert!(matches!(err.kind(), DramaturgErrorKind::Pipeline(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Dramaturg Error: {}", _0)]
pub struct DramaturgError(Box<DramaturgErrorKind>);

impl DramaturgError {
    /// Create a new error from a kind.
    pub fn new(kind: DramaturgErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DramaturgErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to DramaturgErrorKind
impl<T> From<T> for DramaturgError
where
    T: Into<DramaturgErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Dramaturg operations.
pub type DramaturgResult<T> = std::result::Result<T, DramaturgError>;
