//! Station 2: story statements, genres, pitch and tone.

use crate::reply::{
    array, float_field, is_placeholder, is_placeholder_list, item_text, or_not_available,
    or_undetermined, str_field, string_list,
};
use crate::report::{StationReport, list_block};
use crate::{DiagnosticSnapshot, Station, Station1Output, StationContext, tasks};
use async_trait::async_trait;
use dramaturg_core::StageStatus;
use dramaturg_error::StageError;
use dramaturg_models::{ModelRequest, Payload};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{instrument, warn};

/// Text plus the station 1 findings.
#[derive(Debug, Clone, PartialEq)]
pub struct ConceptInput {
    /// Full source text
    pub text: String,
    /// Station 1 output
    pub station1: Station1Output,
}

impl DiagnosticSnapshot for ConceptInput {
    fn diagnostic_snapshot(&self) -> Value {
        json!({
            "chars": self.text.chars().count(),
            "characters": self.station1.major_characters.len(),
        })
    }
}

/// The story on three axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDimensionalMap {
    /// What happens
    pub events_axis: String,
    /// What it means
    pub meaning_axis: String,
    /// How time moves
    pub temporal_axis: String,
}

/// One genre's share of the whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreContribution {
    /// Genre label
    pub genre: String,
    /// What the genre brings
    pub contribution: String,
    /// Relative weight, 0 to 1
    pub weight: f64,
}

/// Tone at one stage of the story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneStage {
    /// Story stage
    pub stage: String,
    /// Tone there
    pub tone: String,
}

/// Station 2 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station2Output {
    /// One-sentence statements of the story, at least one
    pub story_statements: Vec<String>,
    /// Events, meaning and time
    pub three_d_map: ThreeDimensionalMap,
    /// Elevator pitch
    pub elevator_pitch: String,
    /// Genre labels, at least one
    pub hybrid_genres: Vec<String>,
    /// Contribution per genre
    pub genre_matrix: Vec<GenreContribution>,
    /// Tone per stage
    pub dynamic_tone: Vec<ToneStage>,
    /// Comparable works
    pub artistic_references: Vec<String>,
}

impl StationReport for Station2Output {
    fn title(&self) -> &'static str {
        "Station 2: Conceptual Analysis"
    }

    fn render_text(&self) -> String {
        let mut text = list_block("Story statements", &self.story_statements);
        text.push_str(&format!("\nElevator pitch:\n{}\n\n", self.elevator_pitch));
        text.push_str(&format!(
            "Events axis: {}\nMeaning axis: {}\nTemporal axis: {}\n\n",
            self.three_d_map.events_axis,
            self.three_d_map.meaning_axis,
            self.three_d_map.temporal_axis
        ));
        text.push_str(&list_block("Hybrid genres", &self.hybrid_genres));
        text.push_str("\nGenre matrix:\n");
        for row in &self.genre_matrix {
            text.push_str(&format!("  {} ({:.2}): {}\n", row.genre, row.weight, row.contribution));
        }
        text.push_str("\nDynamic tone:\n");
        for stage in &self.dynamic_tone {
            text.push_str(&format!("  {}: {}\n", stage.stage, stage.tone));
        }
        text.push('\n');
        text.push_str(&list_block("Artistic references", &self.artistic_references));
        text
    }
}

/// Station 2: abstracts the story into concepts.
#[derive(Debug, Clone)]
pub struct ConceptStation {
    ctx: StationContext,
}

impl ConceptStation {
    /// Station over a shared context.
    pub fn new(ctx: StationContext) -> Self {
        Self { ctx }
    }

    fn brief(&self, input: &ConceptInput) -> String {
        let style = &input.station1.narrative_style;
        format!(
            "Major characters: {}\nTone: {}\nPacing: {}\nRelationships: {}",
            input.station1.major_characters.join(", "),
            style.overall_tone,
            style.pacing,
            input.station1.relationship_summary
        )
    }

    /// JSON reply, or `None` after logging when the call fails.
    async fn ask(&self, request: ModelRequest, what: &str) -> Option<Payload<Value>> {
        match self.ctx.client().generate_json::<Value>(&request).await {
            Ok(response) => Some(response.into_content()),
            Err(err) => {
                warn!(section = what, error = %err, "Concept section failed");
                None
            }
        }
    }

    async fn list(&self, task: &str, instruction: &str, keys: &[&str], brief: &str, text: &str) -> Vec<String> {
        let request = self
            .ctx
            .prompt(task)
            .instruction(instruction)
            .json(format!(r#"{{"{}": ["text"]}}"#, keys[0]))
            .section("Station 1 findings", brief)
            .source(text)
            .build();
        let list = self
            .ask(request, task)
            .await
            .map(|payload| string_list(&payload, keys))
            .unwrap_or_default();
        or_not_available(list, self.ctx.language())
    }

    async fn three_d_map(&self, context: &str) -> ThreeDimensionalMap {
        let language = self.ctx.language();
        let request = self
            .ctx
            .prompt(tasks::THREE_D_MAP)
            .instruction("Map the story on three axes: events, meaning and time.")
            .json(r#"{"events_axis": "text", "meaning_axis": "text", "temporal_axis": "text"}"#)
            .section("Concept so far", context)
            .build();
        let value = self
            .ask(request, tasks::THREE_D_MAP)
            .await
            .and_then(Payload::into_structured)
            .unwrap_or(Value::Null);
        ThreeDimensionalMap {
            events_axis: or_undetermined(str_field(&value, &["events_axis", "eventsAxis", "events"]), language),
            meaning_axis: or_undetermined(str_field(&value, &["meaning_axis", "meaningAxis", "meaning"]), language),
            temporal_axis: or_undetermined(
                str_field(&value, &["temporal_axis", "temporalAxis", "time"]),
                language,
            ),
        }
    }

    async fn elevator_pitch(&self, context: &str) -> String {
        let request = self
            .ctx
            .prompt(tasks::ELEVATOR_PITCH)
            .instruction("Write a compelling elevator pitch of two or three sentences.")
            .section("Concept so far", context)
            .build();
        let pitch = match self.ctx.client().generate_text(&request).await {
            Ok(response) => Some(response.into_content().trim().to_string()),
            Err(err) => {
                warn!(error = %err, "Elevator pitch failed");
                None
            }
        };
        or_undetermined(pitch, self.ctx.language())
    }

    async fn genre_matrix(&self, context: &str, genres: &[String]) -> Vec<GenreContribution> {
        let language = self.ctx.language();
        let request = self
            .ctx
            .prompt(tasks::GENRE_MATRIX)
            .instruction("For each genre, state what it contributes to the story and its relative weight (0 to 1).")
            .json(r#"{"genre_matrix": [{"genre": "name", "contribution": "text", "weight": 0.5}]}"#)
            .section("Genres", genres.join("\n"))
            .section("Concept so far", context)
            .build();
        let rows: Vec<GenreContribution> = self
            .ask(request, tasks::GENRE_MATRIX)
            .await
            .and_then(Payload::into_structured)
            .and_then(|value| array(&value, &["genre_matrix", "genres", "matrix"]).cloned())
            .unwrap_or_default()
            .iter()
            .filter_map(|row| {
                let genre = str_field(row, &["genre", "name"])?;
                Some(GenreContribution {
                    genre,
                    contribution: or_undetermined(
                        str_field(row, &["contribution", "description"]),
                        language,
                    ),
                    weight: float_field(row, &["weight", "share"])
                        .unwrap_or(0.0)
                        .clamp(0.0, 1.0),
                })
            })
            .collect();
        if rows.is_empty() {
            vec![GenreContribution {
                genre: language.not_available().to_string(),
                contribution: language.undetermined().to_string(),
                weight: 0.0,
            }]
        } else {
            rows
        }
    }

    async fn dynamic_tone(&self, context: &str) -> Vec<ToneStage> {
        let language = self.ctx.language();
        let request = self
            .ctx
            .prompt(tasks::DYNAMIC_TONE)
            .instruction("Describe how the tone shifts across the stages of the story.")
            .json(r#"{"dynamic_tone": [{"stage": "opening", "tone": "text"}]}"#)
            .section("Concept so far", context)
            .build();
        let stages: Vec<ToneStage> = self
            .ask(request, tasks::DYNAMIC_TONE)
            .await
            .and_then(Payload::into_structured)
            .and_then(|value| array(&value, &["dynamic_tone", "stages", "tone"]).cloned())
            .unwrap_or_default()
            .iter()
            .filter_map(|row| {
                Some(ToneStage {
                    stage: str_field(row, &["stage", "phase", "act"])?,
                    tone: or_undetermined(str_field(row, &["tone", "mood"]).or_else(|| item_text(row)), language),
                })
            })
            .collect();
        if stages.is_empty() {
            vec![ToneStage {
                stage: language.not_available().to_string(),
                tone: language.undetermined().to_string(),
            }]
        } else {
            stages
        }
    }
}

#[async_trait]
impl Station for ConceptStation {
    type Input = ConceptInput;
    type Output = Station2Output;
    const NUMBER: u8 = 2;

    fn name(&self) -> &'static str {
        "Conceptual Analysis"
    }

    #[instrument(skip_all)]
    async fn process(&self, input: &ConceptInput) -> Result<Station2Output, StageError> {
        let brief = self.brief(input);
        let text = input.text.as_str();

        let (story_statements, hybrid_genres) = tokio::join!(
            self.list(
                tasks::STORY_STATEMENTS,
                "Write three one-sentence statements capturing what this story is about.",
                &["story_statements", "statements"],
                &brief,
                text,
            ),
            self.list(
                tasks::HYBRID_GENRES,
                "Name the genres this story blends, most dominant first.",
                &["hybrid_genres", "genres"],
                &brief,
                text,
            )
        );

        let context = format!(
            "{}\n\nStory statements:\n{}\n\nGenres: {}",
            brief,
            story_statements.join("\n"),
            hybrid_genres.join(", ")
        );

        let (three_d_map, elevator_pitch, genre_matrix, dynamic_tone, artistic_references) = tokio::join!(
            self.three_d_map(&context),
            self.elevator_pitch(&context),
            self.genre_matrix(&context, &hybrid_genres),
            self.dynamic_tone(&context),
            self.list(
                tasks::ARTISTIC_REFERENCES,
                "Name films, plays or novels this story resembles in theme or form.",
                &["artistic_references", "references"],
                &context,
                "",
            )
        );

        Ok(Station2Output {
            story_statements,
            three_d_map,
            elevator_pitch,
            hybrid_genres,
            genre_matrix,
            dynamic_tone,
            artistic_references,
        })
    }

    fn fallback(&self) -> Station2Output {
        let language = self.ctx.language();
        let na = || vec![language.not_available().to_string()];
        let undetermined = self.ctx.undetermined();
        Station2Output {
            story_statements: na(),
            three_d_map: ThreeDimensionalMap {
                events_axis: undetermined.clone(),
                meaning_axis: undetermined.clone(),
                temporal_axis: undetermined.clone(),
            },
            elevator_pitch: undetermined,
            hybrid_genres: na(),
            genre_matrix: Vec::new(),
            dynamic_tone: Vec::new(),
            artistic_references: na(),
        }
    }

    fn assess(&self, output: &Station2Output) -> StageStatus {
        let language = self.ctx.language();
        let map = &output.three_d_map;
        let degraded = [&output.story_statements, &output.hybrid_genres, &output.artistic_references]
            .iter()
            .any(|list| is_placeholder_list(list, language))
            || [&output.elevator_pitch, &map.events_axis, &map.meaning_axis, &map.temporal_axis]
                .iter()
                .any(|field| is_placeholder(field, language))
            || output
                .genre_matrix
                .iter()
                .any(|row| is_placeholder(&row.genre, language))
            || output
                .dynamic_tone
                .iter()
                .any(|stage| is_placeholder(&stage.stage, language));
        if degraded {
            StageStatus::Partial
        } else {
            StageStatus::Success
        }
    }
}
