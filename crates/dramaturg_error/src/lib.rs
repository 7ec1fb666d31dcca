//! Error types for the Dramaturg analysis pipeline.
//!
//! This crate provides the foundation error types used throughout the Dramaturg workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use dramaturg_error::{DramaturgResult, ModelError, ModelErrorKind};
//!
//! fn call_backend() -> DramaturgResult<String> {
//!     Err(ModelError::new(ModelErrorKind::ApiRequest("connection refused".into())))?
//! }
//!
//! assert!(call_backend().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod model;
mod network;
mod pipeline;
mod stage;
mod storage;

pub use config::ConfigError;
pub use error::{DramaturgError, DramaturgErrorKind, DramaturgResult};
pub use model::{ModelError, ModelErrorKind};
pub use network::{NetworkError, NetworkErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use stage::{StageError, StageErrorKind};
pub use storage::{StorageError, StorageErrorKind};
