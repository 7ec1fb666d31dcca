//! Station 1: characters, relationship summary and narrative style.

use crate::reply::{
    is_placeholder, is_placeholder_list, or_not_available, or_undetermined, str_field,
    string_list, list_field,
};
use crate::report::{StationReport, list_block};
use crate::{DiagnosticSnapshot, Station, StationContext, tasks};
use async_trait::async_trait;
use dramaturg_core::{StageStatus, word_count};
use dramaturg_error::StageError;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

/// Most characters analysed in depth.
const MAX_CHARACTERS: usize = 7;
/// Fewer characters than this is unusual but accepted.
const MIN_CHARACTERS: usize = 3;

/// The dramatic text and its project name.
#[derive(Debug, Clone, PartialEq)]
pub struct TextInput {
    /// Full source text
    pub text: String,
    /// Project name
    pub project_name: String,
}

impl DiagnosticSnapshot for TextInput {
    fn diagnostic_snapshot(&self) -> Value {
        json!({
            "project": self.project_name,
            "chars": self.text.chars().count(),
            "words": word_count(&self.text),
        })
    }
}

/// Deep dive on one character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterAnalysis {
    /// Character name
    pub name: String,
    /// Defining traits
    pub personality_traits: Vec<String>,
    /// What drives the character
    pub motivations: Vec<String>,
    /// How the character changes
    pub narrative_arc: String,
}

/// Tone, pacing and language of the text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeStyle {
    /// Dominant tone
    pub overall_tone: String,
    /// Rhythm of events
    pub pacing: String,
    /// Register and diction
    pub language_style: String,
}

/// Station 1 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station1Output {
    /// Major character names, at most seven
    pub major_characters: Vec<String>,
    /// One analysis per major character, same order
    pub character_analyses: Vec<CharacterAnalysis>,
    /// Prose summary of the relationships
    pub relationship_summary: String,
    /// Tone, pacing and language
    pub narrative_style: NarrativeStyle,
}

impl Station1Output {
    /// Analysis of a character by name, compared case-insensitively.
    pub fn analysis_for(&self, name: &str) -> Option<&CharacterAnalysis> {
        let wanted = name.trim().to_lowercase();
        self.character_analyses
            .iter()
            .find(|a| a.name.trim().to_lowercase() == wanted)
    }
}

impl StationReport for Station1Output {
    fn title(&self) -> &'static str {
        "Station 1: Text Analysis"
    }

    fn render_text(&self) -> String {
        let mut text = list_block("Major characters", &self.major_characters);
        for analysis in &self.character_analyses {
            text.push_str(&format!("\n{}\n", analysis.name));
            text.push_str(&list_block("  Traits", &analysis.personality_traits));
            text.push_str(&list_block("  Motivations", &analysis.motivations));
            text.push_str(&format!("  Arc: {}\n", analysis.narrative_arc));
        }
        text.push_str(&format!("\nRelationships:\n{}\n", self.relationship_summary));
        text.push_str(&format!(
            "\nTone: {}\nPacing: {}\nLanguage: {}\n",
            self.narrative_style.overall_tone,
            self.narrative_style.pacing,
            self.narrative_style.language_style
        ));
        text
    }
}

/// Deduplicate names, drop empties and placeholders, keep the first seven.
fn clean_names(names: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim().trim_matches('"').trim().to_string();
        if name.is_empty() || name.eq_ignore_ascii_case("n/a") {
            continue;
        }
        let lower = name.to_lowercase();
        if kept.iter().any(|k| k.to_lowercase() == lower) {
            continue;
        }
        kept.push(name);
        if kept.len() == MAX_CHARACTERS {
            break;
        }
    }
    kept
}

/// Station 1: reads the text and identifies its major characters.
#[derive(Debug, Clone)]
pub struct TextAnalysisStation {
    ctx: StationContext,
}

impl TextAnalysisStation {
    /// Station over a shared context.
    pub fn new(ctx: StationContext) -> Self {
        Self { ctx }
    }

    async fn identify_characters(&self, text: &str) -> Result<Vec<String>, StageError> {
        let request = self
            .ctx
            .prompt(tasks::IDENTIFY_CHARACTERS)
            .instruction(format!(
                "List the major characters of this dramatic text, most important first, at most {}.",
                MAX_CHARACTERS
            ))
            .json(r#"{"characters": ["name"]}"#)
            .source(text)
            .build();
        let payload = self
            .ctx
            .client()
            .generate_json::<Value>(&request)
            .await?
            .into_content();

        let names = clean_names(string_list(&payload, &["characters", "major_characters", "names"]));
        if names.is_empty() {
            return Err(StageError::processing("no characters identified"));
        }
        if names.len() < MIN_CHARACTERS {
            warn!(count = names.len(), "Fewer major characters than expected");
        }
        Ok(names)
    }

    async fn analyze_character(&self, text: &str, name: &str) -> CharacterAnalysis {
        let language = self.ctx.language();
        let request = self
            .ctx
            .prompt(tasks::CHARACTER_ANALYSIS)
            .instruction(format!(
                "Analyse the character \"{}\": personality traits, motivations and narrative arc.",
                name
            ))
            .json(r#"{"personality_traits": ["trait"], "motivations": ["motivation"], "narrative_arc": "text"}"#)
            .source(text)
            .build();

        let value = match self.ctx.client().generate_json::<Value>(&request).await {
            Ok(response) => response.into_content().into_structured(),
            Err(err) => {
                warn!(character = name, error = %err, "Character analysis failed");
                None
            }
        }
        .unwrap_or(Value::Null);

        CharacterAnalysis {
            name: name.to_string(),
            personality_traits: or_not_available(
                list_field(&value, &["personality_traits", "personalityTraits", "traits"]),
                language,
            ),
            motivations: or_not_available(list_field(&value, &["motivations", "motives"]), language),
            narrative_arc: or_undetermined(
                str_field(&value, &["narrative_arc", "narrativeArc", "arc"]),
                language,
            ),
        }
    }

    async fn relationship_summary(&self, text: &str, names: &[String]) -> String {
        let request = self
            .ctx
            .prompt(tasks::RELATIONSHIP_SUMMARY)
            .instruction("Summarise, in one or two paragraphs, how the major characters relate to each other.")
            .section("Major characters", names.join("\n"))
            .source(text)
            .build();
        let summary = match self.ctx.client().generate_text(&request).await {
            Ok(response) => Some(response.into_content()),
            Err(err) => {
                warn!(error = %err, "Relationship summary failed");
                None
            }
        };
        or_undetermined(summary.map(|s| s.trim().to_string()), self.ctx.language())
    }

    async fn narrative_style(&self, text: &str) -> NarrativeStyle {
        let language = self.ctx.language();
        let request = self
            .ctx
            .prompt(tasks::NARRATIVE_STYLE)
            .instruction("Describe the narrative style: overall tone, pacing and language style.")
            .json(r#"{"overall_tone": "text", "pacing": "text", "language_style": "text"}"#)
            .source(text)
            .build();
        let value = match self.ctx.client().generate_json::<Value>(&request).await {
            Ok(response) => response.into_content().into_structured(),
            Err(err) => {
                warn!(error = %err, "Narrative style analysis failed");
                None
            }
        }
        .unwrap_or(Value::Null);

        NarrativeStyle {
            overall_tone: or_undetermined(str_field(&value, &["overall_tone", "overallTone", "tone"]), language),
            pacing: or_undetermined(str_field(&value, &["pacing"]), language),
            language_style: or_undetermined(
                str_field(&value, &["language_style", "languageStyle", "language"]),
                language,
            ),
        }
    }
}

#[async_trait]
impl Station for TextAnalysisStation {
    type Input = TextInput;
    type Output = Station1Output;
    const NUMBER: u8 = 1;

    fn name(&self) -> &'static str {
        "Text Analysis"
    }

    #[instrument(skip_all, fields(project = %input.project_name))]
    async fn process(&self, input: &TextInput) -> Result<Station1Output, StageError> {
        let text = input.text.as_str();
        let major_characters = self.identify_characters(text).await?;
        info!(characters = major_characters.len(), "Major characters identified");

        let character_analyses = join_all(
            major_characters
                .iter()
                .map(|name| self.analyze_character(text, name)),
        )
        .await;

        let (relationship_summary, narrative_style) = tokio::join!(
            self.relationship_summary(text, &major_characters),
            self.narrative_style(text)
        );
        debug!("Relationship summary and narrative style complete");

        Ok(Station1Output {
            major_characters,
            character_analyses,
            relationship_summary,
            narrative_style,
        })
    }

    fn fallback(&self) -> Station1Output {
        let undetermined = self.ctx.undetermined();
        Station1Output {
            major_characters: Vec::new(),
            character_analyses: Vec::new(),
            relationship_summary: undetermined.clone(),
            narrative_style: NarrativeStyle {
                overall_tone: undetermined.clone(),
                pacing: undetermined.clone(),
                language_style: undetermined,
            },
        }
    }

    fn assess(&self, output: &Station1Output) -> StageStatus {
        let language = self.ctx.language();
        let style = &output.narrative_style;
        let degraded = is_placeholder(&output.relationship_summary, language)
            || [&style.overall_tone, &style.pacing, &style.language_style]
                .iter()
                .any(|field| is_placeholder(field, language))
            || output.character_analyses.iter().any(|a| {
                is_placeholder(&a.narrative_arc, language)
                    || is_placeholder_list(&a.personality_traits, language)
                    || is_placeholder_list(&a.motivations, language)
            });
        if degraded {
            StageStatus::Partial
        } else {
            StageStatus::Success
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_deduplicated_and_clamped() {
        let names = vec![
            " Layla ".to_string(),
            "layla".into(),
            "".into(),
            "N/A".into(),
            "Omar".into(),
            "A".into(),
            "B".into(),
            "C".into(),
            "D".into(),
            "E".into(),
            "F".into(),
        ];
        let cleaned = clean_names(names);
        assert_eq!(cleaned.len(), MAX_CHARACTERS);
        assert_eq!(cleaned[0], "Layla");
        assert_eq!(cleaned[1], "Omar");
    }

    #[test]
    fn analysis_lookup_ignores_case() {
        let output = Station1Output {
            character_analyses: vec![CharacterAnalysis {
                name: "Layla".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(output.analysis_for("LAYLA").is_some());
        assert!(output.analysis_for("Omar").is_none());
    }
}
