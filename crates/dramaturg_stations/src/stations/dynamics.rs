//! Station 5: conflict dynamics, episodes, symbolism and style.

use crate::metrics::{EvolutionMetrics, TimelineEvent, event_timeline, evolution_metrics};
use crate::reply::{
    array, float_field, int_field, is_placeholder, list_field, or_not_available, or_undetermined,
    str_field,
};
use crate::report::{StationReport, list_block};
use crate::{DiagnosticSnapshot, Station, Station2Output, StationContext, tasks};
use async_trait::async_trait;
use dramaturg_core::StageStatus;
use dramaturg_error::StageError;
use dramaturg_models::ModelRequest;
use dramaturg_network::{ConflictNetwork, ConflictPhase};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

/// Description of the snapshot taken after phase updates.
pub const DYNAMIC_SNAPSHOT: &str = "After dynamic analysis";

/// Text, network and the station 2 concept.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicsInput {
    /// Full source text
    pub text: String,
    /// Network from station 3
    pub network: ConflictNetwork,
    /// Station 2 output
    pub station2: Station2Output,
}

impl DiagnosticSnapshot for DynamicsInput {
    fn diagnostic_snapshot(&self) -> Value {
        json!({
            "chars": self.text.chars().count(),
            "network": self.network.summary(),
            "genres": self.station2.hybrid_genres.len(),
        })
    }
}

/// How one character develops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDevelopment {
    /// Character name
    pub character: String,
    /// Development over the story
    pub development: String,
}

/// Phase progression and its traces in the snapshot history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicAnalysis {
    /// One event per snapshot
    pub event_timeline: Vec<TimelineEvent>,
    /// Change across the history
    pub network_evolution: EvolutionMetrics,
    /// Per-character development
    pub character_development: Vec<CharacterDevelopment>,
    /// Phase updates skipped for naming no known conflict or phase
    #[serde(default)]
    pub dropped_phase_updates: usize,
}

/// One planned episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Position, from 1
    pub number: u32,
    /// Episode title
    pub title: String,
    /// What happens
    pub summary: String,
}

/// Episode plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodicIntegration {
    /// Episodes in order
    pub episodes: Vec<Episode>,
    /// Notes on the overall structure
    pub structure_notes: String,
}

/// Symbols and motifs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolicAnalysis {
    /// Central symbols
    pub key_symbols: Vec<String>,
    /// Recurring motifs
    pub recurring_motifs: Vec<String>,
    /// What they add up to
    pub interpretation: String,
    /// 0 to 10
    pub depth_score: f64,
    /// 0 to 10
    pub consistency_score: f64,
}

/// Tone, pacing and voice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylisticAnalysis {
    /// Tone assessment
    pub tone_assessment: String,
    /// Pacing assessment
    pub pacing_assessment: String,
    /// Voice consistency
    pub voice_consistency: String,
    /// Suggested changes
    pub recommendations: Vec<String>,
}

/// Station 5 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station5Output {
    /// Phase progression and evolution
    pub dynamic_analysis: DynamicAnalysis,
    /// Episode plan
    pub episodic_integration: EpisodicIntegration,
    /// Symbols and motifs
    pub symbolic_analysis: SymbolicAnalysis,
    /// Tone, pacing and voice
    pub stylistic_analysis: StylisticAnalysis,
    /// Updated network, adopted by the pipeline
    #[serde(skip)]
    pub network: Option<ConflictNetwork>,
}

impl StationReport for Station5Output {
    fn title(&self) -> &'static str {
        "Station 5: Dynamic, Symbolic and Stylistic Analysis"
    }

    fn render_text(&self) -> String {
        let dynamics = &self.dynamic_analysis;
        let mut text = String::from("Timeline:\n");
        for event in &dynamics.event_timeline {
            text.push_str(&format!(
                "  [{}] {}: {} characters, {} relationships, {} conflicts\n",
                event.snapshot_index,
                event.description,
                event.characters,
                event.relationships,
                event.conflicts
            ));
            for change in &event.phase_changes {
                text.push_str(&format!(
                    "    {}: {} -> {}\n",
                    change.conflict_name, change.from, change.to
                ));
            }
        }
        let evolution = &dynamics.network_evolution;
        text.push_str(&format!(
            "Stability: {:.2}, phase transitions: {}\n\nCharacter development:\n",
            evolution.stability_score, evolution.phase_transitions
        ));
        for dev in &dynamics.character_development {
            text.push_str(&format!("  {}: {}\n", dev.character, dev.development));
        }

        text.push_str("\nEpisodes:\n");
        for episode in &self.episodic_integration.episodes {
            text.push_str(&format!("  {}. {}: {}\n", episode.number, episode.title, episode.summary));
        }
        text.push_str(&format!("{}\n\n", self.episodic_integration.structure_notes));

        let symbolic = &self.symbolic_analysis;
        text.push_str(&list_block("Key symbols", &symbolic.key_symbols));
        text.push_str(&list_block("Recurring motifs", &symbolic.recurring_motifs));
        text.push_str(&format!(
            "{}\nDepth {:.1}/10, consistency {:.1}/10\n\n",
            symbolic.interpretation, symbolic.depth_score, symbolic.consistency_score
        ));

        let style = &self.stylistic_analysis;
        text.push_str(&format!(
            "Tone: {}\nPacing: {}\nVoice: {}\n",
            style.tone_assessment, style.pacing_assessment, style.voice_consistency
        ));
        text.push_str(&list_block("Style recommendations", &style.recommendations));
        text
    }
}

/// Station 5: moves conflicts through their phases and reads the subtext.
#[derive(Debug, Clone)]
pub struct DynamicsStation {
    ctx: StationContext,
}

impl DynamicsStation {
    /// Station over a shared context.
    pub fn new(ctx: StationContext) -> Self {
        Self { ctx }
    }

    async fn ask(&self, request: ModelRequest, section: &str) -> Value {
        let value = match self.ctx.client().generate_json::<Value>(&request).await {
            Ok(response) => response.into_content().into_structured(),
            Err(err) => {
                warn!(section, error = %err, "Dynamics section failed");
                None
            }
        };
        value.unwrap_or(Value::Null)
    }

    /// Apply model-proposed phases to `network`; returns development notes
    /// and the number of skipped phase updates.
    async fn progress_conflicts(
        &self,
        text: &str,
        network: &mut ConflictNetwork,
    ) -> (Vec<CharacterDevelopment>, usize) {
        let conflicts = network
            .conflicts()
            .values()
            .map(|c| format!("- {} | {} | current phase: {}", c.id(), c.name(), c.phase()))
            .collect::<Vec<_>>()
            .join("\n");
        let characters = network
            .characters()
            .values()
            .map(|c| format!("- {}", c.name()))
            .collect::<Vec<_>>()
            .join("\n");

        let request = self
            .ctx
            .prompt(tasks::CONFLICT_DYNAMICS)
            .instruction(
                "For each conflict, give the phase it reaches by the end of the text. \
                 Then describe how each character develops.",
            )
            .json(r#"{"phase_updates": [{"conflict_id": "conf_000001", "phase": "latent|emerging|escalating|climax|deescalating|resolution|aftermath"}], "character_development": [{"character": "name", "development": "text"}]}"#)
            .section("Conflicts", conflicts)
            .section("Characters", characters)
            .source(text)
            .build();
        let value = self.ask(request, tasks::CONFLICT_DYNAMICS).await;

        let mut dropped = 0;
        for update in array(&value, &["phase_updates", "phaseUpdates"]).into_iter().flatten() {
            let Some(reference) = str_field(update, &["conflict_id", "conflictId", "id", "conflict", "name"])
            else {
                dropped += 1;
                continue;
            };
            let Some(id) = network
                .conflicts()
                .values()
                .find(|c| c.id() == &reference || c.name().eq_ignore_ascii_case(&reference))
                .map(|c| c.id().clone())
            else {
                debug!(%reference, "Phase update names an unknown conflict");
                dropped += 1;
                continue;
            };
            let Some(phase) = str_field(update, &["phase", "to"])
                .as_deref()
                .and_then(ConflictPhase::recognize)
            else {
                debug!(conflict = %id, "Phase update names no known phase");
                dropped += 1;
                continue;
            };
            if let Err(err) = network.update_conflict_phase(&id, phase) {
                debug!(error = %err, "Phase update rejected");
                dropped += 1;
            }
        }

        let mut developments = Vec::new();
        for item in array(&value, &["character_development", "characterDevelopment"])
            .into_iter()
            .flatten()
        {
            let (Some(character), Some(development)) = (
                str_field(item, &["character", "name"]),
                str_field(item, &["development", "arc", "description"]),
            ) else {
                continue;
            };
            if let Some(id) = network.character_by_name(&character).map(|c| c.id().clone())
                && let Err(err) =
                    network.enrich_character_metadata(&id, "development", json!(development))
            {
                debug!(error = %err, "Character annotation rejected");
            }
            developments.push(CharacterDevelopment { character, development });
        }
        (developments, dropped)
    }

    async fn episodic_integration(&self, brief: &str) -> EpisodicIntegration {
        let language = self.ctx.language();
        let request = self
            .ctx
            .prompt(tasks::EPISODIC_STRUCTURE)
            .instruction("Propose an episode structure for adapting this story as a series.")
            .json(r#"{"episodes": [{"number": 1, "title": "text", "summary": "text"}], "structure_notes": "text"}"#)
            .section("Story", brief)
            .build();
        let value = self.ask(request, tasks::EPISODIC_STRUCTURE).await;
        let episodes = array(&value, &["episodes"])
            .into_iter()
            .flatten()
            .enumerate()
            .filter_map(|(i, item)| {
                Some(Episode {
                    number: int_field(item, &["number", "episode"])
                        .and_then(|n| u32::try_from(n).ok())
                        .unwrap_or(i as u32 + 1),
                    title: str_field(item, &["title", "name"])?,
                    summary: or_undetermined(str_field(item, &["summary", "description"]), language),
                })
            })
            .collect();
        EpisodicIntegration {
            episodes,
            structure_notes: or_undetermined(
                str_field(&value, &["structure_notes", "structureNotes", "notes"]),
                language,
            ),
        }
    }

    async fn symbolic_analysis(&self, brief: &str, text: &str) -> SymbolicAnalysis {
        let language = self.ctx.language();
        let request = self
            .ctx
            .prompt(tasks::SYMBOLIC_ANALYSIS)
            .instruction("Identify the key symbols and recurring motifs and interpret them. Score depth and consistency from 0 to 10.")
            .json(r#"{"key_symbols": ["symbol"], "recurring_motifs": ["motif"], "interpretation": "text", "depth_score": 7, "consistency_score": 7}"#)
            .section("Story", brief)
            .source(text)
            .build();
        let value = self.ask(request, tasks::SYMBOLIC_ANALYSIS).await;
        SymbolicAnalysis {
            key_symbols: or_not_available(list_field(&value, &["key_symbols", "keySymbols", "symbols"]), language),
            recurring_motifs: or_not_available(
                list_field(&value, &["recurring_motifs", "recurringMotifs", "motifs"]),
                language,
            ),
            interpretation: or_undetermined(str_field(&value, &["interpretation"]), language),
            depth_score: float_field(&value, &["depth_score", "depthScore"])
                .unwrap_or(0.0)
                .clamp(0.0, 10.0),
            consistency_score: float_field(&value, &["consistency_score", "consistencyScore"])
                .unwrap_or(0.0)
                .clamp(0.0, 10.0),
        }
    }

    async fn stylistic_analysis(&self, text: &str) -> StylisticAnalysis {
        let language = self.ctx.language();
        let request = self
            .ctx
            .prompt(tasks::STYLISTIC_ANALYSIS)
            .instruction("Assess the tone, the pacing and the consistency of voice, and suggest improvements.")
            .json(r#"{"tone_assessment": "text", "pacing_assessment": "text", "voice_consistency": "text", "recommendations": ["text"]}"#)
            .source(text)
            .build();
        let value = self.ask(request, tasks::STYLISTIC_ANALYSIS).await;
        StylisticAnalysis {
            tone_assessment: or_undetermined(str_field(&value, &["tone_assessment", "toneAssessment", "tone"]), language),
            pacing_assessment: or_undetermined(
                str_field(&value, &["pacing_assessment", "pacingAssessment", "pacing"]),
                language,
            ),
            voice_consistency: or_undetermined(
                str_field(&value, &["voice_consistency", "voiceConsistency", "voice"]),
                language,
            ),
            recommendations: or_not_available(list_field(&value, &["recommendations"]), language),
        }
    }
}

#[async_trait]
impl Station for DynamicsStation {
    type Input = DynamicsInput;
    type Output = Station5Output;
    const NUMBER: u8 = 5;

    fn name(&self) -> &'static str {
        "Dynamic and Symbolic Analysis"
    }

    #[instrument(skip_all, fields(conflicts = input.network.conflicts().len()))]
    async fn process(&self, input: &DynamicsInput) -> Result<Station5Output, StageError> {
        let mut network = input.network.clone();
        let (character_development, dropped_phase_updates) =
            self.progress_conflicts(&input.text, &mut network).await;
        if dropped_phase_updates > 0 {
            warn!(dropped = dropped_phase_updates, "Skipped unusable phase updates");
        }
        network.create_snapshot(DYNAMIC_SNAPSHOT);

        let event_timeline = event_timeline(network.snapshots());
        let network_evolution = evolution_metrics(network.snapshots());
        info!(
            snapshots = network_evolution.snapshots_analyzed,
            phase_transitions = network_evolution.phase_transitions,
            stability = network_evolution.stability_score,
            "Network evolution measured"
        );

        let brief = format!(
            "Story statements:\n{}\nGenres: {}\nPitch: {}",
            input.station2.story_statements.join("\n"),
            input.station2.hybrid_genres.join(", "),
            input.station2.elevator_pitch
        );
        let (episodic_integration, symbolic_analysis, stylistic_analysis) = tokio::join!(
            self.episodic_integration(&brief),
            self.symbolic_analysis(&brief, &input.text),
            self.stylistic_analysis(&input.text)
        );

        Ok(Station5Output {
            dynamic_analysis: DynamicAnalysis {
                event_timeline,
                network_evolution,
                character_development,
                dropped_phase_updates,
            },
            episodic_integration,
            symbolic_analysis,
            stylistic_analysis,
            network: Some(network),
        })
    }

    fn fallback(&self) -> Station5Output {
        Station5Output::default()
    }

    fn assess(&self, output: &Station5Output) -> StageStatus {
        let language = self.ctx.language();
        let style = &output.stylistic_analysis;
        let degraded = output.episodic_integration.episodes.is_empty()
            || [
                &output.symbolic_analysis.interpretation,
                &style.tone_assessment,
                &style.pacing_assessment,
                &style.voice_consistency,
            ]
            .iter()
            .any(|field| is_placeholder(field, language));
        if degraded {
            StageStatus::Partial
        } else {
            StageStatus::Success
        }
    }
}
