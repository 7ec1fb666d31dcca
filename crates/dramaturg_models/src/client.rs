//! The model client used by every station.

use crate::{
    ModelRequest, ModelResponse, ModelSettings, Payload, ResponseMetadata, extract_json,
    strip_nulls,
};
use dramaturg_core::{CompletionRequest, Usage};
use dramaturg_error::{DramaturgResult, ModelError, ModelErrorKind};
use dramaturg_interface::TextGenerator;
use dramaturg_rate_limit::Throttle;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Reply text plus what the client learned while obtaining it.
struct Completion {
    model: String,
    prompt: String,
    text: String,
    fallback_used: bool,
    latency_ms: u64,
}

impl Completion {
    fn into_response<T>(self, content: T) -> ModelResponse<T> {
        let usage = Usage::estimate(&self.prompt, &self.text);
        ModelResponse::new(
            self.model,
            content,
            usage,
            ResponseMetadata::new(self.latency_ms, self.fallback_used),
        )
    }
}

/// Model client with throttling, per-call timeout and fallback substitution.
///
/// Every backend call first waits on the injected [`Throttle`]. When the
/// primary model fails and a *different* fallback model is configured, the
/// request is retried exactly once against the fallback; if that also fails,
/// the fallback's error is returned.
///
/// # Example
///
/// ```no_run
/// use dramaturg_models::{GeminiGenerator, ModelClient, ModelRequest, ModelSettings};
/// use dramaturg_rate_limit::{ModelThrottle, ThrottleConfig};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ModelClient::new(
///     Arc::new(GeminiGenerator::new()?),
///     Arc::new(ModelThrottle::new(ThrottleConfig::default())),
///     ModelSettings::new("gemini-2.5-flash", Some("gemini-2.5-flash-lite".into())),
/// );
///
/// let reply = client.generate_text(&ModelRequest::new("Describe Hamlet in one line.")).await?;
/// println!("{}", reply.content());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ModelClient {
    generator: Arc<dyn TextGenerator>,
    throttle: Arc<dyn Throttle>,
    settings: ModelSettings,
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("provider", &self.generator.provider_name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ModelClient {
    /// Create a client over a backend and a throttle.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        throttle: Arc<dyn Throttle>,
        settings: ModelSettings,
    ) -> Self {
        Self {
            generator,
            throttle,
            settings,
        }
    }

    /// Client-wide defaults.
    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Generate raw prose.
    ///
    /// # Errors
    ///
    /// Returns the primary model's error when no distinct fallback exists,
    /// otherwise the fallback's error.
    #[instrument(skip(self, request), fields(prompt_len = request.prompt().len()))]
    pub async fn generate_text(&self, request: &ModelRequest) -> DramaturgResult<ModelResponse<String>> {
        let completion = self.complete(request).await?;
        let text = completion.text.clone();
        Ok(completion.into_response(text))
    }

    /// Generate and parse JSON into `T`.
    ///
    /// A reply that cannot be recovered as JSON, or whose JSON does not fit
    /// `T` even after `null` members are stripped, comes back as
    /// [`Payload::Unstructured`].
    ///
    /// # Errors
    ///
    /// Only backend failures are errors; see [`generate_text`](Self::generate_text).
    #[instrument(skip(self, request), fields(prompt_len = request.prompt().len(), target = std::any::type_name::<T>()))]
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        request: &ModelRequest,
    ) -> DramaturgResult<ModelResponse<Payload<T>>> {
        let completion = self.complete(request).await?;
        let payload = parse_payload::<T>(&completion.text);
        if !payload.is_structured() {
            debug!(
                model = %completion.model,
                reply_len = completion.text.len(),
                "Reply kept unstructured"
            );
        }
        Ok(completion.into_response(payload))
    }

    /// Generate JSON and check it with a caller-supplied guard.
    ///
    /// A value failing the guard is still returned as structured when
    /// `allow_partial` is set; otherwise the raw reply is returned.
    ///
    /// # Errors
    ///
    /// Only backend failures are errors.
    #[instrument(skip(self, request, guard), fields(prompt_len = request.prompt().len()))]
    pub async fn generate_guarded<G>(
        &self,
        request: &ModelRequest,
        guard: G,
        allow_partial: bool,
    ) -> DramaturgResult<ModelResponse<Payload<Value>>>
    where
        G: Fn(&Value) -> bool + Send,
    {
        let completion = self.complete(request).await?;

        let payload = match extract_json(&completion.text).map(strip_nulls) {
            Some(value) if guard(&value) => Payload::Structured(value),
            Some(value) if allow_partial => {
                warn!(model = %completion.model, "Reply failed guard; keeping partial value");
                Payload::Structured(value)
            }
            Some(_) => {
                warn!(model = %completion.model, "Reply failed guard");
                Payload::Unstructured(completion.text.clone())
            }
            None => Payload::Unstructured(completion.text.clone()),
        };

        Ok(completion.into_response(payload))
    }

    /// Run a request against the primary model, substituting the fallback once.
    async fn complete(&self, request: &ModelRequest) -> DramaturgResult<Completion> {
        let prompt = request.build_prompt();
        let primary = request
            .model()
            .clone()
            .unwrap_or_else(|| self.settings.primary_model().clone());
        let fallback = request
            .fallback_model()
            .clone()
            .or_else(|| self.settings.fallback_model().clone())
            .filter(|fallback| fallback != &primary);

        let started = Instant::now();

        let (model, text, fallback_used) = match self.call_model(&primary, &prompt, request).await {
            Ok(text) => (primary, text, false),
            Err(err) => match fallback {
                Some(fallback) => {
                    warn!(
                        primary = %primary,
                        fallback = %fallback,
                        error = %err,
                        "Primary model failed; retrying with fallback"
                    );
                    let text = self.call_model(&fallback, &prompt, request).await?;
                    (fallback, text, true)
                }
                None => return Err(err),
            },
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        debug!(model = %model, latency_ms, fallback_used, reply_len = text.len(), "Model replied");

        Ok(Completion {
            model,
            prompt,
            text,
            fallback_used,
            latency_ms,
        })
    }

    /// One throttled, time-bounded backend call.
    async fn call_model(
        &self,
        model: &str,
        prompt: &str,
        request: &ModelRequest,
    ) -> DramaturgResult<String> {
        self.throttle.throttle(model).await;

        let completion = CompletionRequest::builder()
            .prompt(prompt)
            .model(model)
            .temperature(Some(request.temperature().unwrap_or(*self.settings.temperature())))
            .max_output_tokens(Some(request.max_tokens().unwrap_or(*self.settings.max_tokens())))
            .build()
            .map_err(|e| {
                ModelError::new(ModelErrorKind::ApiRequest(format!(
                    "Failed to build request: {}",
                    e
                )))
            })?;

        let timeout = *self.settings.request_timeout();
        let text = match tokio::time::timeout(timeout, self.generator.complete(&completion)).await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(ModelError::new(ModelErrorKind::Timeout {
                    model: model.to_string(),
                    seconds: timeout.as_secs(),
                })
                .into());
            }
        };

        if text.trim().is_empty() {
            return Err(ModelError::new(ModelErrorKind::EmptyResponse(model.to_string())).into());
        }

        Ok(text)
    }
}

/// Recover `T` from reply text, stripping nulls before a second attempt.
fn parse_payload<T: DeserializeOwned>(text: &str) -> Payload<T> {
    let Some(value) = extract_json(text) else {
        return Payload::Unstructured(text.to_string());
    };

    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Payload::Structured(parsed),
        Err(first) => match serde_json::from_value::<T>(strip_nulls(value)) {
            Ok(parsed) => {
                debug!(error = %first, "Parsed after stripping nulls");
                Payload::Structured(parsed)
            }
            Err(second) => {
                debug!(error = %second, "Reply JSON does not fit expected shape");
                Payload::Unstructured(text.to_string())
            }
        },
    }
}
