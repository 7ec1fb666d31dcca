//! Analysis language selection.

use serde::{Deserialize, Serialize};

/// Language of the source text and of the generated analysis.
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
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    /// Arabic (default)
    #[default]
    Ar,
    /// English
    En,
}

impl Language {
    /// Placeholder for a scalar field the model failed to populate.
    pub fn undetermined(&self) -> &'static str {
        match self {
            Language::Ar => "غير محدد",
            Language::En => "not determined",
        }
    }

    /// Placeholder for a list entry the model failed to populate.
    pub fn not_available(&self) -> &'static str {
        "N/A"
    }

    /// Name of the language as it should appear in a prompt instruction.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::Ar => "Arabic",
            Language::En => "English",
        }
    }
}
