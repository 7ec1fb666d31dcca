//! Per-station progress.

use serde::{Deserialize, Serialize};

/// Where a station is in the current run.
///
/// Every station starts `Pending`, moves to `Running` when the orchestrator
/// reaches it and ends `Completed`, or `Error` when it aborted the run.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum StationState {
    /// Not reached yet
    #[default]
    Pending,
    /// Executing now
    Running,
    /// Returned a result, possibly a fallback
    Completed,
    /// Aborted the run
    Error,
}
