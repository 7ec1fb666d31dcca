//! Model client request, response and settings types.

use chrono::{DateTime, Utc};
use dramaturg_core::Usage;
use dramaturg_rate_limit::ModelsConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A request to the model client.
///
/// The client assembles the final prompt from the system instruction, the
/// context and the task prompt. Unset overrides fall back to
/// [`ModelSettings`].
///
/// # Examples
///
/// ```
/// use dramaturg_models::ModelRequest;
///
/// let request = ModelRequest::builder()
///     .prompt("List the main characters.")
///     .system_instruction("You are a dramaturg.")
///     .temperature(0.2)
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     request.build_prompt(),
///     "You are a dramaturg.\n\nList the main characters."
/// );
/// ```
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
pub struct ModelRequest {
    /// Task prompt
    #[builder(setter(into))]
    prompt: String,
    /// Source material placed between the instruction and the task
    #[builder(default, setter(into, strip_option))]
    context: Option<String>,
    /// Leading instruction
    #[builder(default, setter(into, strip_option))]
    system_instruction: Option<String>,
    /// Sampling temperature override
    #[builder(default, setter(strip_option))]
    temperature: Option<f32>,
    /// Output token limit override
    #[builder(default, setter(strip_option))]
    max_tokens: Option<u32>,
    /// Primary model override
    #[builder(default, setter(into, strip_option))]
    model: Option<String>,
    /// Fallback model override
    #[builder(default, setter(into, strip_option))]
    fallback_model: Option<String>,
}

impl ModelRequest {
    /// Creates a new request builder.
    pub fn builder() -> ModelRequestBuilder {
        ModelRequestBuilder::default()
    }

    /// Request with only a task prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set the context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the primary model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the fallback model.
    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = Some(model.into());
        self
    }

    /// Instruction, context and prompt joined by blank lines, empty parts skipped.
    pub fn build_prompt(&self) -> String {
        [
            self.system_instruction.as_deref(),
            self.context.as_deref(),
            Some(self.prompt.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
    }
}

/// Client-wide defaults.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct ModelSettings {
    /// Model used when a request names none
    primary_model: String,
    /// Model substituted once on failure
    fallback_model: Option<String>,
    /// Upper bound on a single backend call
    request_timeout: Duration,
    /// Default output token limit
    max_tokens: u32,
    /// Default sampling temperature
    temperature: f32,
}

impl ModelSettings {
    /// Settings with the given primary and fallback models and default limits.
    pub fn new(primary_model: impl Into<String>, fallback_model: Option<String>) -> Self {
        Self {
            primary_model: primary_model.into(),
            fallback_model,
            ..Self::from(&ModelsConfig::default())
        }
    }

    /// Override the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl From<&ModelsConfig> for ModelSettings {
    fn from(config: &ModelsConfig) -> Self {
        Self {
            primary_model: config.primary.clone(),
            fallback_model: config.fallback.clone(),
            request_timeout: config.request_timeout(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Timing and fallback information for one client call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Time from first attempt to final reply
    latency_ms: u64,
    /// Whether the fallback model produced the reply
    fallback_used: bool,
    /// When the reply arrived
    timestamp: DateTime<Utc>,
}

impl ResponseMetadata {
    pub(crate) fn new(latency_ms: u64, fallback_used: bool) -> Self {
        Self {
            latency_ms,
            fallback_used,
            timestamp: Utc::now(),
        }
    }
}

/// A model client reply.
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct ModelResponse<T> {
    /// Model that produced the reply
    model: String,
    /// Reply content
    content: T,
    /// Estimated token usage
    usage: Usage,
    /// Timing and fallback information
    metadata: ResponseMetadata,
}

impl<T> ModelResponse<T> {
    pub(crate) fn new(model: String, content: T, usage: Usage, metadata: ResponseMetadata) -> Self {
        Self {
            model,
            content,
            usage,
            metadata,
        }
    }

    /// Consume the response, returning its content.
    pub fn into_content(self) -> T {
        self.content
    }

    /// Replace the content, keeping model, usage and metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ModelResponse<U> {
        ModelResponse {
            model: self.model,
            content: f(self.content),
            usage: self.usage,
            metadata: self.metadata,
        }
    }
}
