//! Deterministic backend for tests and offline runs.
//!
//! [`ScriptedGenerator`] answers each prompt from a list of rules: the first
//! rule whose needle occurs in the prompt wins, otherwise the default reply
//! is used. Every call is recorded so tests can assert on models and prompts.

use async_trait::async_trait;
use dramaturg_core::CompletionRequest;
use dramaturg_error::{DramaturgResult, ModelError, ModelErrorKind};
use dramaturg_interface::TextGenerator;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted, call-recording text generator.
///
/// # Example
///
/// ```
/// use dramaturg_core::CompletionRequest;
/// use dramaturg_interface::TextGenerator;
/// use dramaturg_models::scripted::ScriptedGenerator;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let generator = ScriptedGenerator::new()
///     .with_rule("Task: identify_characters", r#"{"characters": ["Layla"]}"#)
///     .with_default("plain prose");
///
/// let request = CompletionRequest::builder()
///     .prompt("Task: identify_characters\n...")
///     .model("mock")
///     .build()?;
/// assert!(generator.complete(&request).await?.contains("Layla"));
/// assert_eq!(generator.call_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ScriptedGenerator {
    rules: Vec<(String, String)>,
    default_response: String,
    failing_models: HashSet<String>,
    panic_needles: Vec<String>,
    latency: Option<Duration>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGenerator {
    /// Generator answering every prompt with `"{}"`.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default_response: "{}".to_string(),
            failing_models: HashSet::new(),
            panic_needles: Vec::new(),
            latency: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer prompts containing `needle` with `response`.
    pub fn with_rule(mut self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.push((needle.into(), response.into()));
        self
    }

    /// Reply used when no rule matches.
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Every call to `model` fails with an API error.
    pub fn failing_for(mut self, model: impl Into<String>) -> Self {
        self.failing_models.insert(model.into());
        self
    }

    /// Panic on prompts containing `needle`.
    pub fn panicking_on(mut self, needle: impl Into<String>) -> Self {
        self.panic_needles.push(needle.into());
        self
    }

    /// Sleep before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Number of requests received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Models called, in arrival order.
    pub fn models_called(&self) -> Vec<String> {
        self.calls().iter().map(|call| call.model().clone()).collect()
    }

    /// Number of requests whose prompt contains `needle`.
    pub fn calls_matching(&self, needle: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.prompt().contains(needle))
            .count()
    }

    fn respond(&self, req: &CompletionRequest) -> DramaturgResult<String> {
        if self.failing_models.contains(req.model()) {
            return Err(ModelError::new(ModelErrorKind::ApiRequest(format!(
                "scripted failure for {}",
                req.model()
            )))
            .into());
        }

        if let Some(needle) = self
            .panic_needles
            .iter()
            .find(|needle| req.prompt().contains(needle.as_str()))
        {
            panic!("scripted panic on '{}'", needle);
        }

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| req.prompt().contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone());

        Ok(reply)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, req: &CompletionRequest) -> DramaturgResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(req.clone());
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.respond(req)
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
