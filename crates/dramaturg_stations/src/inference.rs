//! Relationship and conflict inference for the network builder.
//!
//! Both inferrers ask the model for every item at once and insert each valid
//! item as a typed record. Items naming unknown characters, self-loops and
//! empty casts are dropped and counted.

use crate::StationContext;
use crate::reply::{array, int_field, list_field, str_field};
use crate::tasks;
use dramaturg_error::DramaturgResult;
use dramaturg_network::{
    ConflictDraft, ConflictNetwork, ConflictPhase, ConflictScope, ConflictSubject,
    Directionality, RelationshipDraft, RelationshipNature, RelationshipType,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// How many inferred items made it into the network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceReport {
    /// Relationship items returned by the model
    pub relationships_proposed: usize,
    /// Relationships inserted
    pub relationships_accepted: usize,
    /// Conflict items returned by the model
    pub conflicts_proposed: usize,
    /// Conflicts inserted
    pub conflicts_accepted: usize,
    /// Items rejected by the network
    pub dropped: usize,
    /// Inference calls that returned no usable JSON
    pub unstructured_replies: usize,
    /// Inference calls that failed on every model
    #[serde(default)]
    pub failed_calls: usize,
}

/// Resolve a name or id to a character id.
fn resolve(network: &ConflictNetwork, reference: &str) -> Option<String> {
    network
        .character(reference.trim())
        .or_else(|| network.character_by_name(reference))
        .map(|c| c.id().clone())
}

fn roster(network: &ConflictNetwork) -> String {
    network
        .characters()
        .values()
        .map(|c| format!("- {}", c.name()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Infers every relationship among the network's characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipInferrer;

impl RelationshipInferrer {
    /// Convert one model item into a draft, or `None` when an endpoint is
    /// unknown.
    pub fn draft(network: &ConflictNetwork, item: &Value) -> Option<RelationshipDraft> {
        let source = resolve(
            network,
            &str_field(item, &["source", "from", "character1", "characterA"])?,
        )?;
        let target = resolve(
            network,
            &str_field(item, &["target", "to", "character2", "characterB"])?,
        )?;
        let label = |keys: &[&str]| str_field(item, keys).unwrap_or_default();
        Some(RelationshipDraft {
            source,
            target,
            kind: RelationshipType::from_label(&label(&["type", "kind", "relationship_type"])),
            nature: RelationshipNature::from_label(&label(&["nature"])),
            directionality: Directionality::from_label(&label(&["directionality", "direction"])),
            strength: int_field(item, &["strength", "intensity"]).unwrap_or(5),
            description: label(&["description"]),
            triggers: list_field(item, &["triggers"]),
        })
    }

    /// Ask the model for relationships and insert the valid ones.
    ///
    /// # Errors
    ///
    /// Only model failures are errors.
    #[instrument(skip_all, fields(characters = network.characters().len()))]
    pub async fn infer(
        &self,
        ctx: &StationContext,
        text: &str,
        network: &mut ConflictNetwork,
        report: &mut InferenceReport,
    ) -> DramaturgResult<()> {
        let request = ctx
            .prompt(tasks::INFER_RELATIONSHIPS)
            .instruction(
                "Identify every significant relationship between the listed characters. \
                 Use the character names exactly as listed. Include each pair at most once per kind of bond.",
            )
            .json(
                r#"{"relationships": [{"source": "name", "target": "name", "type": "family|romantic|friendship|professional|rivalry|mentorship|other", "nature": "supportive|conflictual|ambiguous|neutral", "directionality": "directed|bidirectional", "strength": 1-10, "description": "text", "triggers": ["event"]}]}"#,
            )
            .section("Characters", roster(network))
            .source(text)
            .build();

        let payload = ctx.client().generate_json::<Value>(&request).await?.into_content();
        let Some(value) = payload.structured() else {
            warn!("Relationship inference reply was not JSON");
            report.unstructured_replies += 1;
            return Ok(());
        };

        let items = array(value, &["relationships"]).cloned().unwrap_or_default();
        report.relationships_proposed += items.len();
        for item in &items {
            let inserted = Self::draft(network, item)
                .map(|draft| network.add_relationship(draft).map_err(|e| e.to_string()))
                .unwrap_or_else(|| Err("unknown character".to_string()));
            match inserted {
                Ok(id) => {
                    debug!(id = %id, "Relationship inferred");
                    report.relationships_accepted += 1;
                }
                Err(reason) => {
                    debug!(%reason, item = %item, "Relationship dropped");
                    report.dropped += 1;
                }
            }
        }
        info!(
            proposed = report.relationships_proposed,
            accepted = report.relationships_accepted,
            "Relationships inferred"
        );
        Ok(())
    }
}

/// Infers every conflict among the network's characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictInferrer;

impl ConflictInferrer {
    /// Convert one model item into a draft.
    ///
    /// Unknown names are skipped; related relationships are every existing
    /// relationship joining two members of the cast.
    pub fn draft(network: &ConflictNetwork, item: &Value) -> ConflictDraft {
        let involved_characters: Vec<String> = list_field(
            item,
            &["involved_characters", "involvedCharacters", "characters", "participants"],
        )
        .iter()
        .filter_map(|name| resolve(network, name))
        .collect();

        let related_relationships = network
            .relationships()
            .values()
            .filter(|r| {
                involved_characters.contains(r.source()) && involved_characters.contains(r.target())
            })
            .map(|r| r.id().clone())
            .collect();

        let label = |keys: &[&str]| str_field(item, keys).unwrap_or_default();
        ConflictDraft {
            name: label(&["name", "title"]),
            description: label(&["description"]),
            involved_characters,
            subject: ConflictSubject::from_label(&label(&["subject", "about"])),
            scope: ConflictScope::from_label(&label(&["scope"])),
            phase: ConflictPhase::from_label(&label(&["phase", "stage"])),
            strength: int_field(item, &["strength", "intensity"]).unwrap_or(5),
            related_relationships,
            pivot_points: list_field(item, &["pivot_points", "pivotPoints", "turning_points"]),
        }
    }

    /// Ask the model for conflicts and insert the valid ones.
    ///
    /// # Errors
    ///
    /// Only model failures are errors.
    #[instrument(skip_all, fields(characters = network.characters().len()))]
    pub async fn infer(
        &self,
        ctx: &StationContext,
        text: &str,
        network: &mut ConflictNetwork,
        report: &mut InferenceReport,
    ) -> DramaturgResult<()> {
        let request = ctx
            .prompt(tasks::INFER_CONFLICTS)
            .instruction(
                "Identify every dramatic conflict among the listed characters, internal conflicts included. \
                 Use the character names exactly as listed.",
            )
            .json(
                r#"{"conflicts": [{"name": "title", "description": "text", "involved_characters": ["name"], "subject": "power|love|revenge|ideology|survival|resources|identity|other", "scope": "internal|personal|interpersonal|group|societal|universal", "phase": "latent|emerging|escalating|climax|deescalating|resolution|aftermath", "strength": 1-10, "pivot_points": ["moment"]}]}"#,
            )
            .section("Characters", roster(network))
            .source(text)
            .build();

        let payload = ctx.client().generate_json::<Value>(&request).await?.into_content();
        let Some(value) = payload.structured() else {
            warn!("Conflict inference reply was not JSON");
            report.unstructured_replies += 1;
            return Ok(());
        };

        let items = array(value, &["conflicts"]).cloned().unwrap_or_default();
        report.conflicts_proposed += items.len();
        for item in &items {
            let draft = Self::draft(network, item);
            match network.add_conflict(draft) {
                Ok(id) => {
                    debug!(id = %id, "Conflict inferred");
                    report.conflicts_accepted += 1;
                }
                Err(err) => {
                    debug!(error = %err, item = %item, "Conflict dropped");
                    report.dropped += 1;
                }
            }
        }
        info!(
            proposed = report.conflicts_proposed,
            accepted = report.conflicts_accepted,
            "Conflicts inferred"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cast() -> ConflictNetwork {
        let mut network = ConflictNetwork::new("t");
        network.add_character("Layla", None);
        network.add_character("Omar", None);
        network
    }

    #[test]
    fn relationship_names_resolve_case_insensitively() {
        let network = cast();
        let item = json!({"source": "layla", "target": " OMAR ", "type": "Romance", "strength": "12"});
        let draft = RelationshipInferrer::draft(&network, &item).unwrap();
        assert_eq!(draft.source, "char_000001");
        assert_eq!(draft.target, "char_000002");
        assert_eq!(draft.kind, RelationshipType::Romantic);
        assert_eq!(draft.strength, 12);
    }

    #[test]
    fn relationship_with_unknown_name_is_rejected() {
        let network = cast();
        let item = json!({"source": "Layla", "target": "Nobody"});
        assert!(RelationshipInferrer::draft(&network, &item).is_none());
    }

    #[test]
    fn conflict_skips_unknown_names_and_links_relationships() {
        let mut network = cast();
        network
            .add_relationship(RelationshipDraft {
                source: "char_000001".into(),
                target: "char_000002".into(),
                ..Default::default()
            })
            .unwrap();
        let item = json!({
            "name": "Inheritance",
            "involved_characters": ["Layla", "Ghost", "omar"],
            "subject": "inheritance",
            "phase": "escalating"
        });
        let draft = ConflictInferrer::draft(&network, &item);
        assert_eq!(draft.involved_characters, vec!["char_000001", "char_000002"]);
        assert_eq!(draft.related_relationships, vec!["rel_000001"]);
        assert_eq!(draft.subject, ConflictSubject::Resources);
        assert_eq!(draft.phase, ConflictPhase::Escalating);
    }
}
