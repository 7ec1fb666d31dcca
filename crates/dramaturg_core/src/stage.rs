//! Per-station execution records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome classification for one station run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StageStatus {
    /// All sections produced real model output.
    Success,
    /// Completed, but some sections fell back to placeholders.
    Partial,
    /// The station failed; the output is its fallback value.
    Failed,
}

/// Bookkeeping attached to every station result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct StageMetadata {
    /// Station number (1 to 7).
    station: u8,
    /// Human-readable station name.
    name: String,
    /// When the station finished.
    timestamp: DateTime<Utc>,
    /// Outcome classification.
    status: StageStatus,
    /// Error message when the station failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StageMetadata {
    /// Metadata stamped with the current time.
    pub fn new(
        station: u8,
        name: impl Into<String>,
        status: StageStatus,
        error: Option<String>,
    ) -> Self {
        Self {
            station,
            name: name.into(),
            timestamp: Utc::now(),
            status,
            error,
        }
    }
}

/// The output of one station together with timing and status.
///
/// Results are produced once by the runner and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct StageResult<T> {
    /// Station output, or the station's fallback value on failure.
    output: T,
    /// Wall-clock time spent in the station.
    execution_time_ms: u64,
    /// Status and identification.
    metadata: StageMetadata,
}

impl<T> StageResult<T> {
    /// Assemble a result.
    pub fn new(output: T, execution_time_ms: u64, metadata: StageMetadata) -> Self {
        Self {
            output,
            execution_time_ms,
            metadata,
        }
    }

    /// Consume the result, returning the output.
    pub fn into_output(self) -> T {
        self.output
    }

    /// Shorthand for the metadata status.
    pub fn status(&self) -> StageStatus {
        self.metadata.status
    }

    /// True unless the station failed.
    pub fn is_usable(&self) -> bool {
        self.metadata.status != StageStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&StageStatus::Partial).unwrap();
        assert_eq!(json, "\"partial\"");
    }

    #[test]
    fn failed_result_is_not_usable() {
        let meta = StageMetadata::new(3, "Network", StageStatus::Failed, Some("boom".into()));
        let result = StageResult::new(0u8, 12, meta);
        assert!(!result.is_usable());
        assert_eq!(result.metadata().error().as_deref(), Some("boom"));
    }

    #[test]
    fn result_serializes_camel_case() {
        let meta = StageMetadata::new(1, "Text", StageStatus::Success, None);
        let value = serde_json::to_value(StageResult::new("x", 5, meta)).unwrap();
        assert_eq!(value["executionTimeMs"], 5);
        assert!(value["metadata"].get("error").is_none());
    }
}
