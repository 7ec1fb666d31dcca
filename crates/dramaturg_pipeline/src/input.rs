//! Normalisation and validation of pipeline requests.

use dramaturg_core::Language;
use dramaturg_error::{DramaturgResult, PipelineError, PipelineErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

/// Project name used when the request names none.
const UNTITLED: &str = "untitled";

/// Canonical field names and the alternates accepted for them.
const ALIASES: &[(&str, &[&str])] = &[
    ("fullText", &["screenplayText", "text", "script"]),
    ("projectName", &["title", "project"]),
];

/// Request shape after alias normalisation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawInput {
    full_text: Option<String>,
    project_name: Option<String>,
    language: Option<String>,
    temperature: Option<f32>,
    model: Option<String>,
    fallback_model: Option<String>,
    flags: BTreeMap<String, bool>,
}

/// A validated pipeline request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct PipelineInput {
    /// Screenplay text, never blank
    full_text: String,
    /// Project name
    project_name: String,
    /// Analysis language
    language: Language,
    /// Sampling temperature override
    temperature: Option<f32>,
    /// Primary model override
    model: Option<String>,
    /// Fallback model override
    fallback_model: Option<String>,
    /// Caller-defined switches, carried through to the run metadata
    flags: BTreeMap<String, bool>,
}

#[track_caller]
fn invalid(message: impl Into<String>) -> PipelineError {
    PipelineError::new(PipelineErrorKind::InvalidInput(message.into()))
}

/// Move alternate field names onto their canonical keys.
///
/// A canonical key already present wins; otherwise the first alias present
/// is renamed.
fn normalize(mut fields: Map<String, Value>) -> Map<String, Value> {
    for (canonical, aliases) in ALIASES {
        if fields.contains_key(*canonical) {
            continue;
        }
        if let Some(alias) = aliases.iter().find(|alias| fields.contains_key(**alias))
            && let Some(value) = fields.remove(*alias)
        {
            debug!(alias, canonical, "Normalised input field");
            fields.insert((*canonical).to_string(), value);
        }
    }
    fields
}

impl PipelineInput {
    /// Request for `full_text` with every option at its default.
    ///
    /// # Errors
    ///
    /// Fails when the text is blank.
    pub fn new(full_text: impl Into<String>) -> DramaturgResult<Self> {
        let full_text = full_text.into();
        if full_text.trim().is_empty() {
            return Err(invalid("fullText must not be empty").into());
        }
        Ok(Self {
            full_text,
            project_name: UNTITLED.to_string(),
            language: Language::default(),
            temperature: None,
            model: None,
            fallback_model: None,
            flags: BTreeMap::new(),
        })
    }

    /// Normalise and validate a raw JSON request.
    ///
    /// Accepts `fullText` (or `screenplayText`, `text`, `script`),
    /// `projectName` (or `title`, `project`), `language`, `temperature`,
    /// `model`, `fallbackModel` and `flags`. Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineErrorKind::InvalidInput`] when the request is not
    /// an object, the text is missing or blank, a field has the wrong type,
    /// the language is unsupported or the temperature is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use dramaturg_core::Language;
    /// use dramaturg_pipeline::PipelineInput;
    /// use serde_json::json;
    ///
    /// let input = PipelineInput::from_value(json!({
    ///     "script": "INT. KITCHEN - DAY",
    ///     "title": "Breakfast",
    ///     "language": "EN",
    /// }))
    /// .unwrap();
    ///
    /// assert_eq!(input.full_text(), "INT. KITCHEN - DAY");
    /// assert_eq!(input.project_name(), "Breakfast");
    /// assert_eq!(*input.language(), Language::En);
    /// ```
    pub fn from_value(value: Value) -> DramaturgResult<Self> {
        let Value::Object(fields) = value else {
            return Err(invalid("request must be a JSON object").into());
        };

        let raw: RawInput = serde_json::from_value(Value::Object(normalize(fields)))
            .map_err(|e| invalid(format!("malformed request: {}", e)))?;

        let mut input = Self::new(raw.full_text.unwrap_or_default())?;

        if let Some(name) = raw.project_name.as_deref().map(str::trim)
            && !name.is_empty()
        {
            input.project_name = name.to_string();
        }

        if let Some(code) = raw.language.as_deref().map(str::trim)
            && !code.is_empty()
        {
            input.language = Language::from_str(code)
                .map_err(|_| invalid(format!("unsupported language '{}'", code)))?;
        }

        if let Some(temperature) = raw.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(invalid(format!(
                    "temperature {} is outside 0.0..=2.0",
                    temperature
                ))
                .into());
            }
            input.temperature = Some(temperature);
        }

        input.model = raw.model.filter(|m| !m.trim().is_empty());
        input.fallback_model = raw.fallback_model.filter(|m| !m.trim().is_empty());
        input.flags = raw.flags;
        Ok(input)
    }

    /// Set the project name.
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    /// Set the analysis language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the primary and fallback model overrides.
    pub fn with_models(mut self, model: Option<String>, fallback_model: Option<String>) -> Self {
        self.model = model;
        self.fallback_model = fallback_model;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dramaturg_error::DramaturgErrorKind;
    use serde_json::json;

    fn invalid_message(value: Value) -> String {
        let err = PipelineInput::from_value(value).unwrap_err();
        match err.kind() {
            DramaturgErrorKind::Pipeline(e) => match &e.kind {
                PipelineErrorKind::InvalidInput(message) => message.clone(),
                other => panic!("unexpected kind {other}"),
            },
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn canonical_names_and_defaults() {
        let input = PipelineInput::from_value(json!({ "fullText": "FADE IN." })).unwrap();
        assert_eq!(input.project_name(), "untitled");
        assert_eq!(*input.language(), Language::Ar);
        assert!(input.temperature().is_none());
        assert!(input.flags().is_empty());
    }

    #[test]
    fn canonical_key_wins_over_alias() {
        let input = PipelineInput::from_value(json!({
            "fullText": "canonical",
            "text": "alias",
            "project": "Alias project",
        }))
        .unwrap();
        assert_eq!(input.full_text(), "canonical");
        assert_eq!(input.project_name(), "Alias project");
    }

    #[test]
    fn screenplay_text_alias_precedes_text() {
        let input = PipelineInput::from_value(json!({
            "text": "second",
            "screenplayText": "first",
        }))
        .unwrap();
        assert_eq!(input.full_text(), "first");
    }

    #[test]
    fn overrides_and_flags_are_kept() {
        let input = PipelineInput::from_value(json!({
            "fullText": "x",
            "temperature": 0.3,
            "model": "gemini-2.5-pro",
            "fallbackModel": " ",
            "flags": { "verbose": true },
        }))
        .unwrap();
        assert_eq!(*input.temperature(), Some(0.3));
        assert_eq!(input.model().as_deref(), Some("gemini-2.5-pro"));
        assert!(input.fallback_model().is_none());
        assert_eq!(input.flags().get("verbose"), Some(&true));
    }

    #[test]
    fn rejects_missing_or_blank_text() {
        assert!(invalid_message(json!({ "projectName": "p" })).contains("fullText"));
        assert!(invalid_message(json!({ "fullText": "  \n " })).contains("fullText"));
    }

    #[test]
    fn rejects_non_objects_and_bad_fields() {
        assert!(invalid_message(json!("just text")).contains("object"));
        assert!(invalid_message(json!({ "fullText": "x", "language": "fr" })).contains("fr"));
        assert!(invalid_message(json!({ "fullText": "x", "temperature": 7.5 })).contains("7.5"));
        assert!(invalid_message(json!({ "fullText": 42 })).contains("malformed"));
    }
}
