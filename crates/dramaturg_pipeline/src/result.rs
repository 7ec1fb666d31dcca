//! The aggregate record of one pipeline run.

use chrono::{DateTime, Utc};
use dramaturg_core::{Language, StageResult, StageStatus};
use dramaturg_stations::{
    Station1Output, Station2Output, Station3Output, Station4Output, Station5Output,
    Station6Output, Station7Output,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The output of every station, fallbacks included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationOutputs {
    /// Text analysis
    pub station1: Station1Output,
    /// Concept and genre
    pub station2: Station2Output,
    /// Conflict network
    pub station3: Station3Output,
    /// Efficiency metrics
    pub station4: Station4Output,
    /// Dynamic, symbolic and stylistic analysis
    pub station5: Station5Output,
    /// Diagnostics and treatment
    pub station6: Station6Output,
    /// Final report
    pub station7: Station7Output,
}

/// Status and timing of one station, without its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    /// Station number
    pub station: u8,
    /// Station name
    pub name: String,
    /// Outcome
    pub status: StageStatus,
    /// Wall-clock time spent in the station
    pub execution_time_ms: u64,
    /// When the station finished
    pub timestamp: DateTime<Utc>,
    /// Failure message, when the station fell back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<&StageResult<T>> for StageSummary {
    fn from(result: &StageResult<T>) -> Self {
        let metadata = result.metadata();
        Self {
            station: *metadata.station(),
            name: metadata.name().clone(),
            status: *metadata.status(),
            execution_time_ms: *result.execution_time_ms(),
            timestamp: *metadata.timestamp(),
            error: metadata.error().clone(),
        }
    }
}

/// Run-level bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMetadata {
    /// Project name
    pub project_name: String,
    /// Analysis language
    pub language: Language,
    /// Stations that returned a result
    pub stages_completed: usize,
    /// Wall-clock time of the whole run, delays included
    pub total_execution_time_ms: u64,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Files written by the run
    pub artifacts: Vec<String>,
    /// Caller-defined switches from the request
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub flags: BTreeMap<String, bool>,
}

/// Everything a pipeline run produced.
///
/// Serialises with camelCase keys; the network's maps serialise key-ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunResult {
    /// Per-station outputs
    pub station_outputs: StationOutputs,
    /// Per-station status and timing, keyed by station number
    pub station_results: BTreeMap<u8, StageSummary>,
    /// Run-level bookkeeping
    pub pipeline_metadata: PipelineMetadata,
}

impl PipelineRunResult {
    /// Stations whose result is a fallback.
    pub fn failed_stations(&self) -> Vec<u8> {
        self.station_results
            .values()
            .filter(|summary| summary.status == StageStatus::Failed)
            .map(|summary| summary.station)
            .collect()
    }
}
