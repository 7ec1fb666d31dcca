//! Network records and the drafts used to insert them.

use crate::{
    ConflictPhase, ConflictScope, ConflictSubject, Directionality, RelationshipNature,
    RelationshipType,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Free-form annotations attached by later stations.
pub type Metadata = BTreeMap<String, Value>;

/// What station 1 learned about a character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    /// Defining traits
    personality_traits: Vec<String>,
    /// What drives the character
    motivations: Vec<String>,
    /// How the character changes
    narrative_arc: String,
}

impl CharacterProfile {
    /// Build a profile.
    pub fn new(personality_traits: Vec<String>, motivations: Vec<String>, narrative_arc: impl Into<String>) -> Self {
        Self {
            personality_traits,
            motivations,
            narrative_arc: narrative_arc.into(),
        }
    }
}

/// A character node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Stable id (`char_000001`, ...)
    id: String,
    /// Display name as it appears in the text
    name: String,
    /// Station 1 profile, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<CharacterProfile>,
    /// Annotations from later stations
    metadata: Metadata,
}

impl Character {
    pub(crate) fn new(id: String, name: String, profile: Option<CharacterProfile>) -> Self {
        Self {
            id,
            name,
            profile,
            metadata: Metadata::new(),
        }
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Input for [`ConflictNetwork::add_relationship`](crate::ConflictNetwork::add_relationship).
///
/// Endpoints are character ids. Strength is clamped to 1..=10 on insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipDraft {
    /// Source character id
    pub source: String,
    /// Target character id
    pub target: String,
    /// Kind of bond
    pub kind: RelationshipType,
    /// Emotional charge
    pub nature: RelationshipNature,
    /// One way or mutual
    pub directionality: Directionality,
    /// Intensity, 1 to 10
    pub strength: i64,
    /// Free-text description
    pub description: String,
    /// Events that activate the relationship
    pub triggers: Vec<String>,
}

/// An edge between two distinct characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Stable id (`rel_000001`, ...)
    id: String,
    /// Source character id
    source: String,
    /// Target character id
    target: String,
    /// Kind of bond
    #[serde(rename = "type")]
    kind: RelationshipType,
    /// Emotional charge
    nature: RelationshipNature,
    /// One way or mutual
    directionality: Directionality,
    /// Intensity, 1 to 10
    strength: u8,
    /// Free-text description
    description: String,
    /// Events that activate the relationship
    triggers: Vec<String>,
    /// Annotations from later stations
    metadata: Metadata,
}

impl Relationship {
    pub(crate) fn from_draft(id: String, draft: RelationshipDraft) -> Self {
        Self {
            id,
            source: draft.source,
            target: draft.target,
            kind: draft.kind,
            nature: draft.nature,
            directionality: draft.directionality,
            strength: clamp_strength(draft.strength),
            description: draft.description,
            triggers: draft.triggers,
            metadata: Metadata::new(),
        }
    }

    /// Whether the relationship touches a character.
    pub fn involves(&self, character_id: &str) -> bool {
        self.source == character_id || self.target == character_id
    }

    /// Endpoints in sorted order, for pair comparisons.
    pub fn unordered_pair(&self) -> (&str, &str) {
        if self.source <= self.target {
            (&self.source, &self.target)
        } else {
            (&self.target, &self.source)
        }
    }
}

/// Input for [`ConflictNetwork::add_conflict`](crate::ConflictNetwork::add_conflict).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictDraft {
    /// Short title
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Character ids, at least one
    pub involved_characters: Vec<String>,
    /// What the conflict is about
    pub subject: ConflictSubject,
    /// Breadth
    pub scope: ConflictScope,
    /// Current stage
    pub phase: ConflictPhase,
    /// Intensity, 1 to 10
    pub strength: i64,
    /// Relationship ids the conflict runs through
    pub related_relationships: Vec<String>,
    /// Turning points
    pub pivot_points: Vec<String>,
}

/// A conflict among one or more characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Stable id (`conf_000001`, ...)
    id: String,
    /// Short title
    name: String,
    /// Free-text description
    description: String,
    /// Character ids, never empty
    involved_characters: Vec<String>,
    /// What the conflict is about
    subject: ConflictSubject,
    /// Breadth
    scope: ConflictScope,
    /// Current stage
    phase: ConflictPhase,
    /// Intensity, 1 to 10
    strength: u8,
    /// Relationship ids the conflict runs through
    related_relationships: Vec<String>,
    /// Turning points
    pivot_points: Vec<String>,
    /// Annotations from later stations
    metadata: Metadata,
}

impl Conflict {
    pub(crate) fn from_draft(id: String, draft: ConflictDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            involved_characters: draft.involved_characters,
            subject: draft.subject,
            scope: draft.scope,
            phase: draft.phase,
            strength: clamp_strength(draft.strength),
            related_relationships: draft.related_relationships,
            pivot_points: draft.pivot_points,
            metadata: Metadata::new(),
        }
    }

    /// Whether a character takes part.
    pub fn involves(&self, character_id: &str) -> bool {
        self.involved_characters.iter().any(|id| id == character_id)
    }

    pub(crate) fn set_phase(&mut self, phase: ConflictPhase) {
        self.phase = phase;
    }
}

fn clamp_strength(strength: i64) -> u8 {
    strength.clamp(1, 10) as u8
}
