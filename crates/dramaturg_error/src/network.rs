//! Conflict network invariant violations.

/// Reasons a relationship or conflict cannot enter the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum NetworkErrorKind {
    /// Referenced character id is not in the network
    #[display("Unknown character: {}", _0)]
    UnknownCharacter(String),
    /// Relationship source and target are the same character
    #[display("Relationship cannot connect {} to itself", _0)]
    SelfRelationship(String),
    /// Conflict has no involved characters
    #[display("Conflict '{}' involves no characters", _0)]
    EmptyConflict(String),
    /// Referenced conflict id is not in the network
    #[display("Unknown conflict: {}", _0)]
    UnknownConflict(String),
}

/// Network error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Network Error: {} at line {} in {}", kind, line, file)]
pub struct NetworkError {
    /// The specific invariant violated
    pub kind: NetworkErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl NetworkError {
    /// Create a new NetworkError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NetworkErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
