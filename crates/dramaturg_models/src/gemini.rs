//! Google Gemini backend.
//!
//! [`GeminiGenerator`] keeps one `gemini-rust` client per model id, created
//! lazily on first use. Requests may therefore switch models freely (the
//! model client does this when substituting its fallback).

use async_trait::async_trait;
use dramaturg_core::CompletionRequest;
use dramaturg_error::{DramaturgResult, ModelError, ModelErrorKind};
use dramaturg_interface::TextGenerator;
use gemini_rust::{Gemini, client::Model};
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// Text generation over the Gemini REST API.
#[derive(Clone)]
pub struct GeminiGenerator {
    api_key: String,
    clients: Arc<Mutex<HashMap<String, Arc<Gemini>>>>,
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let client_count = self.clients.lock().map(|c| c.len()).unwrap_or(0);
        f.debug_struct("GeminiGenerator")
            .field("cached_clients", &client_count)
            .finish_non_exhaustive()
    }
}

impl GeminiGenerator {
    /// Create a generator reading the API key from `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelErrorKind::MissingApiKey`] when the variable is unset or empty.
    pub fn new() -> DramaturgResult<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ModelError::new(ModelErrorKind::MissingApiKey))?;
        Ok(Self::with_api_key(api_key))
    }

    /// Create a generator with an explicit API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Convert a model id to a gemini-rust model, adding the `models/`
    /// prefix the API expects for ids without a dedicated variant.
    fn model_name_to_enum(name: &str) -> Model {
        match name {
            "gemini-2.5-flash" => Model::Gemini25Flash,
            "gemini-2.5-flash-lite" => Model::Gemini25FlashLite,
            "gemini-2.5-pro" => Model::Gemini25Pro,
            other if other.starts_with("models/") => Model::Custom(other.to_string()),
            other => Model::Custom(format!("models/{}", other)),
        }
    }

    /// Get or create the pooled client for a model.
    fn client_for(&self, model: &str) -> Result<Arc<Gemini>, ModelError> {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(client) = clients.get(model) {
            return Ok(client.clone());
        }

        debug!(model, "Creating Gemini client");
        let client = Gemini::with_model(&self.api_key, Self::model_name_to_enum(model))
            .map_err(|e| ModelError::new(ModelErrorKind::ClientCreation(e.to_string())))?;
        let client = Arc::new(client);
        clients.insert(model.to_string(), client.clone());
        Ok(client)
    }

    /// Map a gemini-rust error onto an HTTP or generic request failure.
    fn parse_gemini_error(err: impl std::fmt::Display) -> ModelError {
        let message = err.to_string();
        match Self::extract_status_code(&message) {
            Some(status_code) => ModelError::new(ModelErrorKind::HttpError {
                status_code,
                message,
            }),
            None => ModelError::new(ModelErrorKind::ApiRequest(message)),
        }
    }

    /// Parse "bad response from server; code 503; ..." style messages.
    fn extract_status_code(message: &str) -> Option<u16> {
        let code_start = message.find("code ")? + 5;
        let digits: String = message[code_start..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    #[instrument(skip(self, req), fields(model = %req.model(), prompt_len = req.prompt().len()))]
    async fn complete(&self, req: &CompletionRequest) -> DramaturgResult<String> {
        let client = self.client_for(req.model())?;

        let mut builder = client.generate_content().with_user_message(req.prompt());

        if let Some(temperature) = req.temperature() {
            builder = builder.with_temperature(*temperature);
        }
        if let Some(max_tokens) = req.max_output_tokens() {
            builder = builder.with_max_output_tokens(*max_tokens as i32);
        }

        let response = builder.execute().await.map_err(Self::parse_gemini_error)?;
        Ok(response.text())
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
