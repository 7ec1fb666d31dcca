//! Station 3: build the conflict network.

use crate::inference::{ConflictInferrer, InferenceReport, RelationshipInferrer};
use crate::report::StationReport;
use crate::{DiagnosticSnapshot, Station, Station1Output, StationContext};
use async_trait::async_trait;
use dramaturg_core::StageStatus;
use dramaturg_error::StageError;
use dramaturg_network::{CharacterProfile, ConflictNetwork, NetworkSummary};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

/// Description of the snapshot taken once inference completes.
pub const INITIAL_SNAPSHOT: &str = "Initial state after inference";

/// Text, project name and the station 1 cast.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkInput {
    /// Full source text
    pub text: String,
    /// Project name, used as the network name
    pub project_name: String,
    /// Station 1 output
    pub station1: Station1Output,
}

impl DiagnosticSnapshot for NetworkInput {
    fn diagnostic_snapshot(&self) -> Value {
        json!({
            "project": self.project_name,
            "chars": self.text.chars().count(),
            "characters": self.station1.major_characters.len(),
        })
    }
}

/// Station 3 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station3Output {
    /// The network with its initial snapshot
    pub network: ConflictNetwork,
    /// Entity counts
    pub network_summary: NetworkSummary,
    /// Inference bookkeeping
    pub inference_report: InferenceReport,
}

impl StationReport for Station3Output {
    fn title(&self) -> &'static str {
        "Station 3: Conflict Network"
    }

    fn render_text(&self) -> String {
        let network = &self.network;
        let name_of = |id: &String| {
            network
                .character(id)
                .map(|c| c.name().clone())
                .unwrap_or_else(|| id.clone())
        };

        let mut text = format!(
            "Characters: {}\nRelationships: {}\nConflicts: {}\n\n",
            self.network_summary.characters_count,
            self.network_summary.relationships_count,
            self.network_summary.conflicts_count
        );
        text.push_str("Relationships:\n");
        for rel in network.relationships().values() {
            text.push_str(&format!(
                "  {} - {} [{}, {}, strength {}] {}\n",
                name_of(rel.source()),
                name_of(rel.target()),
                rel.kind(),
                rel.nature(),
                rel.strength(),
                rel.description()
            ));
        }
        text.push_str("\nConflicts:\n");
        for conflict in network.conflicts().values() {
            let cast: Vec<String> = conflict.involved_characters().iter().map(name_of).collect();
            text.push_str(&format!(
                "  {} ({}, {}, {}) - {}\n",
                conflict.name(),
                conflict.subject(),
                conflict.scope(),
                conflict.phase(),
                cast.join(", ")
            ));
        }
        text.push_str(&format!(
            "\nInference: {}/{} relationships and {}/{} conflicts accepted, {} dropped, {} failed calls\n",
            self.inference_report.relationships_accepted,
            self.inference_report.relationships_proposed,
            self.inference_report.conflicts_accepted,
            self.inference_report.conflicts_proposed,
            self.inference_report.dropped,
            self.inference_report.failed_calls
        ));
        text
    }
}

/// Station 3: turns the cast into a conflict network.
#[derive(Debug, Clone)]
pub struct NetworkBuilderStation {
    ctx: StationContext,
}

impl NetworkBuilderStation {
    /// Station over a shared context.
    pub fn new(ctx: StationContext) -> Self {
        Self { ctx }
    }

    fn seed_network(input: &NetworkInput) -> ConflictNetwork {
        let mut network = ConflictNetwork::new(input.project_name.clone());
        for name in &input.station1.major_characters {
            let profile = input.station1.analysis_for(name).map(|analysis| {
                CharacterProfile::new(
                    analysis.personality_traits.clone(),
                    analysis.motivations.clone(),
                    analysis.narrative_arc.clone(),
                )
            });
            network.add_character(name, profile);
        }
        network
    }
}

#[async_trait]
impl Station for NetworkBuilderStation {
    type Input = NetworkInput;
    type Output = Station3Output;
    const NUMBER: u8 = 3;

    fn name(&self) -> &'static str {
        "Conflict Network"
    }

    #[instrument(skip_all, fields(project = %input.project_name))]
    async fn process(&self, input: &NetworkInput) -> Result<Station3Output, StageError> {
        let mut network = Self::seed_network(input);
        if network.is_empty() {
            return Err(StageError::processing("station 1 produced no characters"));
        }

        let mut report = InferenceReport::default();
        if let Err(err) = RelationshipInferrer
            .infer(&self.ctx, &input.text, &mut network, &mut report)
            .await
        {
            warn!(error = %err, "Relationship inference failed; keeping the cast");
            report.failed_calls += 1;
        }
        if let Err(err) = ConflictInferrer
            .infer(&self.ctx, &input.text, &mut network, &mut report)
            .await
        {
            warn!(error = %err, "Conflict inference failed; keeping the cast");
            report.failed_calls += 1;
        }

        network.create_snapshot(INITIAL_SNAPSHOT);
        let network_summary = network.summary();
        if network_summary.conflicts_count == 0 {
            warn!("Network has no conflicts");
        }
        info!(
            characters = network_summary.characters_count,
            relationships = network_summary.relationships_count,
            conflicts = network_summary.conflicts_count,
            dropped = report.dropped,
            "Conflict network built"
        );

        Ok(Station3Output {
            network,
            network_summary,
            inference_report: report,
        })
    }

    fn fallback(&self) -> Station3Output {
        Station3Output::default()
    }

    fn assess(&self, output: &Station3Output) -> StageStatus {
        let report = &output.inference_report;
        if report.unstructured_replies > 0 || report.failed_calls > 0 {
            StageStatus::Partial
        } else {
            StageStatus::Success
        }
    }
}
