//! The conflict network and its snapshot history.

use crate::{
    Character, CharacterProfile, Conflict, ConflictDraft, ConflictPhase, Relationship,
    RelationshipDraft,
};
use chrono::{DateTime, Utc};
use dramaturg_error::{NetworkError, NetworkErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Width of the numeric part of entity ids.
const ID_DIGITS: usize = 6;

/// Zero-padded sequential id; lexical order matches numeric order below
/// one million entities per map.
fn sequence_id(prefix: &str, n: usize) -> String {
    format!("{prefix}_{n:0width$}", width = ID_DIGITS)
}

/// Frozen copy of the network at one point in the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Position in the history, from 0
    index: usize,
    /// When the copy was taken
    timestamp: DateTime<Utc>,
    /// Why the copy was taken
    description: String,
    /// Characters at that moment
    characters: BTreeMap<String, Character>,
    /// Relationships at that moment
    relationships: BTreeMap<String, Relationship>,
    /// Conflicts at that moment
    conflicts: BTreeMap<String, Conflict>,
}

/// Entity counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSummary {
    /// Characters in the network
    pub characters_count: usize,
    /// Relationships in the network
    pub relationships_count: usize,
    /// Conflicts in the network
    pub conflicts_count: usize,
    /// Snapshots recorded
    pub snapshots_count: usize,
}

/// Characters, relationships and conflicts of one dramatic text.
///
/// Ids are zero-padded and assigned in insertion order, so map order equals
/// insertion order. Nothing is ever removed.
///
/// # Example
///
/// ```
/// use dramaturg_network::{ConflictDraft, ConflictNetwork, RelationshipDraft, RelationshipType};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut network = ConflictNetwork::new("Hamlet");
/// let hamlet = network.add_character("Hamlet", None);
/// let claudius = network.add_character("Claudius", None);
///
/// network.add_relationship(RelationshipDraft {
///     source: hamlet.clone(),
///     target: claudius.clone(),
///     kind: RelationshipType::Family,
///     strength: 9,
///     ..Default::default()
/// })?;
///
/// network.add_conflict(ConflictDraft {
///     name: "Revenge for a father".into(),
///     involved_characters: vec![hamlet, claudius],
///     ..Default::default()
/// })?;
///
/// let first = *network.create_snapshot("Initial state").index();
/// assert_eq!(first, 0);
/// assert_eq!(network.summary().relationships_count, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct ConflictNetwork {
    /// Project name
    name: String,
    /// Characters by id
    characters: BTreeMap<String, Character>,
    /// Relationships by id
    relationships: BTreeMap<String, Relationship>,
    /// Conflicts by id
    conflicts: BTreeMap<String, Conflict>,
    /// Append-only snapshot history
    snapshots: Vec<Snapshot>,
    /// Creation time
    created_at: DateTime<Utc>,
}

impl Default for ConflictNetwork {
    fn default() -> Self {
        Self::new("untitled")
    }
}

impl ConflictNetwork {
    /// Empty network.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            characters: BTreeMap::new(),
            relationships: BTreeMap::new(),
            conflicts: BTreeMap::new(),
            snapshots: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Add a character, returning its id.
    ///
    /// A name already present (compared trimmed and case-insensitively)
    /// returns the existing id and leaves the network unchanged.
    pub fn add_character(&mut self, name: &str, profile: Option<CharacterProfile>) -> String {
        let name = name.trim();
        if let Some(existing) = self.character_by_name(name) {
            return existing.id().clone();
        }

        let id = sequence_id("char", self.characters.len() + 1);
        trace!(id = %id, name, "Adding character");
        self.characters
            .insert(id.clone(), Character::new(id.clone(), name.to_string(), profile));
        id
    }

    /// Add a relationship between two existing, distinct characters.
    ///
    /// # Errors
    ///
    /// `SelfRelationship` when source equals target, `UnknownCharacter`
    /// when either endpoint is missing.
    pub fn add_relationship(&mut self, draft: RelationshipDraft) -> Result<String, NetworkError> {
        if draft.source == draft.target {
            return Err(NetworkError::new(NetworkErrorKind::SelfRelationship(
                draft.source,
            )));
        }
        for endpoint in [&draft.source, &draft.target] {
            if !self.characters.contains_key(endpoint) {
                return Err(NetworkError::new(NetworkErrorKind::UnknownCharacter(
                    endpoint.clone(),
                )));
            }
        }

        let id = sequence_id("rel", self.relationships.len() + 1);
        trace!(id = %id, source = %draft.source, target = %draft.target, "Adding relationship");
        self.relationships
            .insert(id.clone(), Relationship::from_draft(id.clone(), draft));
        Ok(id)
    }

    /// Add a conflict among existing characters.
    ///
    /// Duplicate character ids are collapsed and unknown related
    /// relationships are dropped.
    ///
    /// # Errors
    ///
    /// `EmptyConflict` when no characters are involved, `UnknownCharacter`
    /// when any involved id is missing.
    pub fn add_conflict(&mut self, mut draft: ConflictDraft) -> Result<String, NetworkError> {
        let mut seen = Vec::with_capacity(draft.involved_characters.len());
        for id in draft.involved_characters.drain(..) {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        draft.involved_characters = seen;

        if draft.involved_characters.is_empty() {
            return Err(NetworkError::new(NetworkErrorKind::EmptyConflict(draft.name)));
        }
        if let Some(missing) = draft
            .involved_characters
            .iter()
            .find(|id| !self.characters.contains_key(*id))
        {
            return Err(NetworkError::new(NetworkErrorKind::UnknownCharacter(
                missing.clone(),
            )));
        }

        let before = draft.related_relationships.len();
        draft
            .related_relationships
            .retain(|id| self.relationships.contains_key(id));
        if draft.related_relationships.len() < before {
            debug!(
                conflict = %draft.name,
                dropped = before - draft.related_relationships.len(),
                "Dropped unknown related relationships"
            );
        }

        let id = sequence_id("conf", self.conflicts.len() + 1);
        trace!(id = %id, name = %draft.name, "Adding conflict");
        self.conflicts
            .insert(id.clone(), Conflict::from_draft(id.clone(), draft));
        Ok(id)
    }

    /// Character with a matching name, trimmed and case-insensitive.
    pub fn character_by_name(&self, name: &str) -> Option<&Character> {
        let wanted = name.trim().to_lowercase();
        self.characters
            .values()
            .find(|c| c.name().trim().to_lowercase() == wanted)
    }

    /// Character by id.
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }

    /// Relationships touching a character.
    pub fn relationships_for(&self, character_id: &str) -> Vec<&Relationship> {
        self.relationships
            .values()
            .filter(|r| r.involves(character_id))
            .collect()
    }

    /// Conflicts a character takes part in.
    pub fn conflicts_for(&self, character_id: &str) -> Vec<&Conflict> {
        self.conflicts
            .values()
            .filter(|c| c.involves(character_id))
            .collect()
    }

    /// Number of relationships plus conflicts touching a character.
    pub fn involvement(&self, character_id: &str) -> usize {
        self.relationships_for(character_id).len() + self.conflicts_for(character_id).len()
    }

    /// Move a conflict to a new phase.
    ///
    /// # Errors
    ///
    /// `UnknownConflict` when the id is missing.
    pub fn update_conflict_phase(
        &mut self,
        conflict_id: &str,
        phase: ConflictPhase,
    ) -> Result<ConflictPhase, NetworkError> {
        let conflict = self.conflicts.get_mut(conflict_id).ok_or_else(|| {
            NetworkError::new(NetworkErrorKind::UnknownConflict(conflict_id.to_string()))
        })?;
        let previous = *conflict.phase();
        conflict.set_phase(phase);
        debug!(conflict = conflict_id, from = %previous, to = %phase, "Conflict phase updated");
        Ok(previous)
    }

    /// Attach an annotation to a character.
    ///
    /// # Errors
    ///
    /// `UnknownCharacter` when the id is missing.
    pub fn enrich_character_metadata(
        &mut self,
        character_id: &str,
        key: impl Into<String>,
        value: Value,
    ) -> Result<(), NetworkError> {
        let character = self.characters.get_mut(character_id).ok_or_else(|| {
            NetworkError::new(NetworkErrorKind::UnknownCharacter(character_id.to_string()))
        })?;
        character.metadata_mut().insert(key.into(), value);
        Ok(())
    }

    /// Record a deep copy of the current state.
    pub fn create_snapshot(&mut self, description: impl Into<String>) -> &Snapshot {
        let snapshot = Snapshot {
            index: self.snapshots.len(),
            timestamp: Utc::now(),
            description: description.into(),
            characters: self.characters.clone(),
            relationships: self.relationships.clone(),
            conflicts: self.conflicts.clone(),
        };
        debug!(
            index = snapshot.index,
            description = %snapshot.description,
            "Network snapshot recorded"
        );
        self.snapshots.push(snapshot);
        &self.snapshots[self.snapshots.len() - 1]
    }

    /// Most recent snapshot.
    pub fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Entity counts.
    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            characters_count: self.characters.len(),
            relationships_count: self.relationships.len(),
            conflicts_count: self.conflicts.len(),
            snapshots_count: self.snapshots.len(),
        }
    }

    /// True when the network holds no characters.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
