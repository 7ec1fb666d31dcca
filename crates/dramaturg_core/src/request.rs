//! Request type handed to text-generation backends.

use serde::{Deserialize, Serialize};

/// A single completion call against one model.
///
/// The prompt is already fully assembled (system instruction, context and task
/// concatenated); backends never see structured input.
///
/// # Examples
///
/// ```
/// use dramaturg_core::CompletionRequest;
///
/// let request = CompletionRequest::builder()
///     .prompt("Summarise the first act.")
///     .model("gemini-2.5-flash")
///     .temperature(Some(0.4))
///     .max_output_tokens(Some(2048))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.model(), "gemini-2.5-flash");
/// assert_eq!(*request.max_output_tokens(), Some(2048));
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
pub struct CompletionRequest {
    /// Fully assembled prompt text
    #[builder(setter(into))]
    prompt: String,
    /// Model identifier to call
    #[builder(setter(into))]
    model: String,
    /// Sampling temperature (0.0 to 1.0)
    #[builder(default)]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[builder(default)]
    max_output_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Creates a new request builder.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }
}
