//! Generative backend integrations and the model client.
//!
//! - [`GeminiGenerator`]: [`TextGenerator`](dramaturg_interface::TextGenerator)
//!   over the Gemini REST API with one pooled client per model
//! - [`ModelClient`]: prompt assembly, throttling, per-call timeout and a
//!   single fallback substitution on failure
//! - [`extract_json`]: lenient, repairing JSON recovery from model prose
//! - [`scripted::ScriptedGenerator`]: deterministic backend for tests and
//!   offline runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod extraction;
mod gemini;
mod payload;
mod request;
pub mod scripted;

pub use client::ModelClient;
pub use extraction::{extract_json, strip_nulls};
pub use gemini::GeminiGenerator;
pub use payload::Payload;
pub use request::{
    ModelRequest, ModelRequestBuilder, ModelResponse, ModelSettings, ResponseMetadata,
};
