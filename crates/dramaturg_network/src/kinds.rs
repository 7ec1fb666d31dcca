//! Closed-set classifications for relationships and conflicts.
//!
//! Models rarely answer with exactly the expected label, so every enum has a
//! lenient `from_label` that trims, lowercases and accepts common synonyms,
//! falling back to a neutral default.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lowercase, trim, and unify separators to `_`.
fn normalize(label: &str) -> String {
    label
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.')
        .to_lowercase()
        .replace(['-', ' '], "_")
}

/// Kind of bond between two characters.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RelationshipType {
    /// Blood or marriage
    Family,
    /// Love interest
    Romantic,
    /// Friends
    Friendship,
    /// Work or duty
    Professional,
    /// Competition or enmity
    Rivalry,
    /// Teacher and student
    Mentorship,
    /// Anything else
    #[default]
    Other,
}

impl RelationshipType {
    /// Parse a model-provided label, defaulting to `Other`.
    pub fn from_label(label: &str) -> Self {
        let label = normalize(label);
        if let Ok(kind) = Self::from_str(&label) {
            return kind;
        }
        match label.as_str() {
            "familial" | "kinship" | "sibling" | "parent" | "marriage" | "عائلية" | "أسرية" => {
                Self::Family
            }
            "love" | "romance" | "marital" | "عاطفية" | "حب" => Self::Romantic,
            "friend" | "friends" | "companionship" | "صداقة" => Self::Friendship,
            "work" | "business" | "colleague" | "colleagues" | "مهنية" => Self::Professional,
            "rival" | "enemy" | "enemies" | "enmity" | "antagonistic" | "عداوة" | "تنافس" => {
                Self::Rivalry
            }
            "mentor" | "mentoring" | "teacher" | "guidance" | "إرشاد" => Self::Mentorship,
            _ => Self::Other,
        }
    }
}

/// Emotional charge of a relationship.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RelationshipNature {
    /// Helps the other character
    Supportive,
    /// Works against the other character
    Conflictual,
    /// Mixed or unclear
    Ambiguous,
    /// No strong charge
    #[default]
    Neutral,
}

impl RelationshipNature {
    /// Parse a model-provided label, defaulting to `Neutral`.
    pub fn from_label(label: &str) -> Self {
        let label = normalize(label);
        if let Ok(nature) = Self::from_str(&label) {
            return nature;
        }
        match label.as_str() {
            "positive" | "supporting" | "cooperative" | "داعمة" | "إيجابية" => Self::Supportive,
            "negative" | "hostile" | "conflicting" | "antagonistic" | "صراعية" | "سلبية" => {
                Self::Conflictual
            }
            "mixed" | "complex" | "complicated" | "غامضة" | "مختلطة" => Self::Ambiguous,
            _ => Self::Neutral,
        }
    }
}

/// Whether a relationship runs one way or both ways.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Directionality {
    /// Source acts on target
    Directed,
    /// Mutual
    #[default]
    Bidirectional,
}

impl Directionality {
    /// Parse a model-provided label, defaulting to `Bidirectional`.
    pub fn from_label(label: &str) -> Self {
        let label = normalize(label);
        if let Ok(direction) = Self::from_str(&label) {
            return direction;
        }
        match label.as_str() {
            "one_way" | "unidirectional" | "unilateral" | "اتجاه_واحد" => Self::Directed,
            _ => Self::Bidirectional,
        }
    }
}

/// What a conflict is about.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConflictSubject {
    /// Control or status
    Power,
    /// Affection
    Love,
    /// Retribution
    Revenge,
    /// Beliefs and values
    Ideology,
    /// Staying alive
    Survival,
    /// Money, land, goods
    Resources,
    /// Self and belonging
    Identity,
    /// Anything else
    #[default]
    Other,
}

impl ConflictSubject {
    /// Parse a model-provided label, defaulting to `Other`.
    pub fn from_label(label: &str) -> Self {
        let label = normalize(label);
        if let Ok(subject) = Self::from_str(&label) {
            return subject;
        }
        match label.as_str() {
            "control" | "authority" | "status" | "سلطة" | "قوة" => Self::Power,
            "romance" | "jealousy" | "حب" => Self::Love,
            "vengeance" | "retribution" | "انتقام" | "ثأر" => Self::Revenge,
            "belief" | "beliefs" | "values" | "religion" | "politics" | "أيديولوجيا" => {
                Self::Ideology
            }
            "life" | "death" | "بقاء" => Self::Survival,
            "money" | "wealth" | "land" | "inheritance" | "موارد" | "ميراث" => Self::Resources,
            "self" | "belonging" | "honor" | "هوية" => Self::Identity,
            _ => Self::Other,
        }
    }
}

/// Breadth of a conflict, from one mind to the whole world.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConflictScope {
    /// Within one character
    Internal,
    /// Touching one character's private life
    #[default]
    Personal,
    /// Between characters
    Interpersonal,
    /// Between groups
    Group,
    /// Society-wide
    Societal,
    /// Existential
    Universal,
}

impl ConflictScope {
    /// Parse a model-provided label, defaulting to `Personal`.
    pub fn from_label(label: &str) -> Self {
        let label = normalize(label);
        if let Ok(scope) = Self::from_str(&label) {
            return scope;
        }
        match label.as_str() {
            "inner" | "psychological" | "داخلي" => Self::Internal,
            "interpersonal_conflict" | "between_characters" | "relational" | "بين_الشخصيات" => {
                Self::Interpersonal
            }
            "family" | "community" | "collective" | "جماعي" => Self::Group,
            "social" | "society" | "political" | "مجتمعي" => Self::Societal,
            "global" | "cosmic" | "existential" | "كوني" => Self::Universal,
            _ => Self::Personal,
        }
    }
}

/// Stage of a conflict's life, strictly ordered.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConflictPhase {
    /// Present but unspoken
    #[default]
    Latent,
    /// Surfacing
    Emerging,
    /// Intensifying
    Escalating,
    /// Peak
    Climax,
    /// Cooling
    Deescalating,
    /// Settled
    Resolution,
    /// Consequences
    Aftermath,
}

impl ConflictPhase {
    /// Parse a model-provided label, defaulting to `Latent`.
    pub fn from_label(label: &str) -> Self {
        Self::recognize(label).unwrap_or_default()
    }

    /// Parse a model-provided label, or `None` when it names no known phase.
    ///
    /// Use this when overwriting an existing phase, where falling back to
    /// `Latent` would rewind the conflict.
    pub fn recognize(label: &str) -> Option<Self> {
        let label = normalize(label);
        if let Ok(phase) = Self::from_str(&label) {
            return Some(phase);
        }
        let phase = match label.as_str() {
            "hidden" | "dormant" | "كامن" => Self::Latent,
            "rising" | "emergence" | "beginning" | "ناشئ" => Self::Emerging,
            "escalation" | "intensifying" | "rising_action" | "متصاعد" => Self::Escalating,
            "peak" | "climactic" | "ذروة" => Self::Climax,
            "de_escalating" | "de_escalation" | "deescalation" | "falling" | "falling_action"
            | "متراجع" => Self::Deescalating,
            "resolved" | "resolving" | "حل" => Self::Resolution,
            "after" | "consequences" | "epilogue" | "ما_بعد" => Self::Aftermath,
            _ => return None,
        };
        Some(phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn exact_labels_roundtrip() {
        for kind in RelationshipType::iter() {
            assert_eq!(RelationshipType::from_label(kind.as_ref()), kind);
        }
        for phase in ConflictPhase::iter() {
            assert_eq!(ConflictPhase::from_label(&phase.to_string()), phase);
        }
    }

    #[test]
    fn labels_are_lenient() {
        assert_eq!(RelationshipType::from_label("  Romance "), RelationshipType::Romantic);
        assert_eq!(RelationshipNature::from_label("HOSTILE"), RelationshipNature::Conflictual);
        assert_eq!(Directionality::from_label("one-way"), Directionality::Directed);
        assert_eq!(ConflictPhase::from_label("De-escalating"), ConflictPhase::Deescalating);
        assert_eq!(ConflictScope::from_label("social"), ConflictScope::Societal);
        assert_eq!(ConflictSubject::from_label("\"inheritance\""), ConflictSubject::Resources);
    }

    #[test]
    fn unknown_labels_use_defaults() {
        assert_eq!(RelationshipType::from_label("???"), RelationshipType::Other);
        assert_eq!(RelationshipNature::from_label(""), RelationshipNature::Neutral);
        assert_eq!(ConflictPhase::from_label("unclear"), ConflictPhase::Latent);
        assert_eq!(ConflictPhase::recognize("unclear"), None);
        assert_eq!(ConflictPhase::recognize(""), None);
        assert_eq!(ConflictPhase::recognize("Peak"), Some(ConflictPhase::Climax));
        assert_eq!(ConflictScope::from_label("unclear"), ConflictScope::Personal);
    }

    #[test]
    fn phases_are_strictly_ordered() {
        let phases: Vec<_> = ConflictPhase::iter().collect();
        assert!(phases.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(phases.first(), Some(&ConflictPhase::Latent));
        assert_eq!(phases.last(), Some(&ConflictPhase::Aftermath));
    }
}
