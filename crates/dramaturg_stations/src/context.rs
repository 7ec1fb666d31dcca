//! Shared station collaborators and prompt assembly.

use dramaturg_core::{Language, truncate_chars};
use dramaturg_models::{ModelClient, ModelRequest};
use std::sync::Arc;

/// What every station needs to talk to the model.
#[derive(Debug, Clone)]
pub struct StationContext {
    client: Arc<ModelClient>,
    language: Language,
    max_text_chars: usize,
    temperature: Option<f32>,
    model: Option<String>,
    fallback_model: Option<String>,
}

impl StationContext {
    /// Context with no per-run overrides.
    pub fn new(client: Arc<ModelClient>, language: Language, max_text_chars: usize) -> Self {
        Self {
            client,
            language,
            max_text_chars,
            temperature: None,
            model: None,
            fallback_model: None,
        }
    }

    /// Sampling temperature for every request of the run.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Primary and fallback model overrides for the run.
    pub fn with_models(mut self, model: Option<String>, fallback_model: Option<String>) -> Self {
        self.model = model;
        self.fallback_model = fallback_model;
        self
    }

    /// The model client.
    pub fn client(&self) -> &ModelClient {
        &self.client
    }

    /// Analysis language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Source text cut to the configured prompt budget.
    pub fn source_text<'a>(&self, text: &'a str) -> &'a str {
        truncate_chars(text, self.max_text_chars)
    }

    /// Placeholder for an empty scalar field.
    pub fn undetermined(&self) -> String {
        self.language.undetermined().to_string()
    }

    /// Start a prompt for `task`.
    pub(crate) fn prompt(&self, task: &str) -> PromptBuilder<'_> {
        PromptBuilder {
            ctx: self,
            task: task.to_string(),
            instruction: String::new(),
            shape: None,
            context: Vec::new(),
        }
    }
}

/// Assembles a task-tagged [`ModelRequest`].
///
/// The prompt always opens with `Task: <id>`, followed by the instruction,
/// an optional JSON shape hint and the response-language rule.
pub(crate) struct PromptBuilder<'a> {
    ctx: &'a StationContext,
    task: String,
    instruction: String,
    shape: Option<String>,
    context: Vec<String>,
}

impl PromptBuilder<'_> {
    pub(crate) fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Ask for JSON shaped like `shape`.
    pub(crate) fn json(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    /// Append a labelled block of source material.
    pub(crate) fn section(mut self, label: &str, body: impl AsRef<str>) -> Self {
        let body = body.as_ref().trim();
        if !body.is_empty() {
            self.context.push(format!("### {}\n{}", label, body));
        }
        self
    }

    /// Append the source text, truncated to the prompt budget.
    pub(crate) fn source(self, text: &str) -> Self {
        let ctx = self.ctx;
        self.section("Source text", ctx.source_text(text))
    }

    pub(crate) fn build(self) -> ModelRequest {
        let language = self.ctx.language.prompt_name();
        let mut prompt = format!("Task: {}\n\n{}", self.task, self.instruction.trim());
        match &self.shape {
            Some(shape) => prompt.push_str(&format!(
                "\n\nRespond with JSON only, shaped like:\n{}\nKeep JSON keys and enum labels in English; write every free-text value in {}.",
                shape.trim(),
                language
            )),
            None => prompt.push_str(&format!("\n\nWrite the answer in {}.", language)),
        }

        let mut request = ModelRequest::new(prompt).with_system_instruction(
            "You are an expert dramaturg and script analyst. Ground every statement in the material provided.",
        );
        if !self.context.is_empty() {
            request = request.with_context(self.context.join("\n\n"));
        }
        if let Some(temperature) = self.ctx.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(model) = &self.ctx.model {
            request = request.with_model(model.clone());
        }
        if let Some(fallback) = &self.ctx.fallback_model {
            request = request.with_fallback_model(fallback.clone());
        }
        request
    }
}
