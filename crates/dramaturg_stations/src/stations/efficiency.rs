//! Station 4: graph metrics and recommendations.

use crate::metrics::{EfficiencyMetrics, network_metrics};
use crate::reply::list_field;
use crate::report::{StationReport, list_block};
use crate::{DiagnosticSnapshot, Station, StationContext, tasks};
use async_trait::async_trait;
use dramaturg_core::StageStatus;
use dramaturg_error::StageError;
use dramaturg_models::Payload;
use dramaturg_network::ConflictNetwork;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

/// The network to measure.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyInput {
    /// Network from station 3
    pub network: ConflictNetwork,
}

impl DiagnosticSnapshot for EfficiencyInput {
    fn diagnostic_snapshot(&self) -> Value {
        json!(self.network.summary())
    }
}

/// What to change, by urgency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    /// Most important changes
    pub priority_actions: Vec<String>,
    /// Small, local fixes
    pub quick_fixes: Vec<String>,
    /// Larger rework
    pub structural_revisions: Vec<String>,
    /// Prose reply when the model returned no JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Station 4 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station4Output {
    /// Graph metrics
    pub efficiency_metrics: EfficiencyMetrics,
    /// Model recommendations
    pub recommendations: Recommendations,
}

impl StationReport for Station4Output {
    fn title(&self) -> &'static str {
        "Station 4: Efficiency Metrics"
    }

    fn render_text(&self) -> String {
        let m = &self.efficiency_metrics;
        let mut text = format!(
            "Overall efficiency: {:.2}/10 ({})\nConflict cohesion: {:.2}\nDramatic balance: {:.2} (gini {:.2})\nNarrative density: {:.2}\nRedundancy: characters {:.2}, relationships {:.2}, conflicts {:.2}\n\n",
            m.overall_efficiency_score,
            m.overall_rating,
            m.conflict_cohesion,
            m.dramatic_balance.balance_score,
            m.dramatic_balance.involvement_gini,
            m.narrative_density,
            m.redundancy.character_redundancy,
            m.redundancy.relationship_redundancy,
            m.redundancy.conflict_redundancy,
        );
        let r = &self.recommendations;
        text.push_str(&list_block("Priority actions", &r.priority_actions));
        text.push_str(&list_block("Quick fixes", &r.quick_fixes));
        text.push_str(&list_block("Structural revisions", &r.structural_revisions));
        if let Some(narrative) = &r.narrative {
            text.push_str(&format!("\n{}\n", narrative));
        }
        text
    }
}

/// Station 4: measures how economically the network carries the drama.
#[derive(Debug, Clone)]
pub struct EfficiencyStation {
    ctx: StationContext,
}

impl EfficiencyStation {
    /// Station over a shared context.
    pub fn new(ctx: StationContext) -> Self {
        Self { ctx }
    }

    async fn recommendations(&self, metrics: &EfficiencyMetrics, network: &ConflictNetwork) -> Recommendations {
        let request = self
            .ctx
            .prompt(tasks::EFFICIENCY_RECOMMENDATIONS)
            .instruction(
                "Given these network efficiency metrics, recommend how to tighten the drama.",
            )
            .json(r#"{"priority_actions": ["text"], "quick_fixes": ["text"], "structural_revisions": ["text"]}"#)
            .section("Metrics", json!(metrics).to_string())
            .section("Network", json!(network.summary()).to_string())
            .build();

        match self.ctx.client().generate_json::<Value>(&request).await {
            Ok(response) => match response.into_content() {
                Payload::Structured(value) => Recommendations {
                    priority_actions: list_field(&value, &["priority_actions", "priorityActions"]),
                    quick_fixes: list_field(&value, &["quick_fixes", "quickFixes"]),
                    structural_revisions: list_field(
                        &value,
                        &["structural_revisions", "structuralRevisions"],
                    ),
                    narrative: None,
                },
                Payload::Unstructured(raw) => Recommendations {
                    narrative: Some(raw.trim().to_string()),
                    ..Default::default()
                },
            },
            Err(err) => {
                warn!(error = %err, "Recommendations failed");
                Recommendations {
                    narrative: Some(self.ctx.undetermined()),
                    ..Default::default()
                }
            }
        }
    }
}

#[async_trait]
impl Station for EfficiencyStation {
    type Input = EfficiencyInput;
    type Output = Station4Output;
    const NUMBER: u8 = 4;

    fn name(&self) -> &'static str {
        "Efficiency Metrics"
    }

    #[instrument(skip_all)]
    async fn process(&self, input: &EfficiencyInput) -> Result<Station4Output, StageError> {
        let efficiency_metrics = network_metrics(&input.network);
        info!(
            score = efficiency_metrics.overall_efficiency_score,
            rating = %efficiency_metrics.overall_rating,
            "Efficiency metrics computed"
        );
        let recommendations = self.recommendations(&efficiency_metrics, &input.network).await;
        Ok(Station4Output {
            efficiency_metrics,
            recommendations,
        })
    }

    fn fallback(&self) -> Station4Output {
        Station4Output::default()
    }

    fn assess(&self, output: &Station4Output) -> StageStatus {
        let r = &output.recommendations;
        let empty = r.priority_actions.is_empty()
            && r.quick_fixes.is_empty()
            && r.structural_revisions.is_empty();
        if r.narrative.is_some() || empty {
            StageStatus::Partial
        } else {
            StageStatus::Success
        }
    }
}
