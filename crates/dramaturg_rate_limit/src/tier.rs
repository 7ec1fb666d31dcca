//! Model cost tiers.

use serde::{Deserialize, Serialize};

/// Cost tier of a model. Pricier tiers are spaced further apart.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ModelTier {
    /// Lite and flash-lite models.
    Cheap,
    /// Standard flash models. Unknown models land here.
    #[default]
    Mid,
    /// Pro models.
    Top,
}
