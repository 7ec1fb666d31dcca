//! Core data types for the Dramaturg screenplay analysis pipeline.
//!
//! This crate provides the foundation types shared by the model client, the
//! analysis stations and the pipeline orchestrator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod language;
mod request;
mod stage;
mod telemetry;
mod text;
mod usage;

pub use language::Language;
pub use request::{CompletionRequest, CompletionRequestBuilder};
pub use stage::{StageMetadata, StageResult, StageStatus};
pub use telemetry::init_tracing;
pub use text::{truncate_chars, word_count};
pub use usage::{Usage, estimate_tokens};
