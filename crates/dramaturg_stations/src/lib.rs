//! The seven analysis stations of the Dramaturg pipeline.
//!
//! Each station implements [`Station`] and is driven by a [`StationRunner`],
//! which contains every failure: a station that errors still yields a
//! [`StageResult`](dramaturg_core::StageResult) holding its fallback output.
//!
//! | # | Station | Output |
//! |---|---------|--------|
//! | 1 | [`TextAnalysisStation`] | characters, relationship summary, narrative style |
//! | 2 | [`ConceptStation`] | story statements, genres, pitch, tone |
//! | 3 | [`NetworkBuilderStation`] | the conflict network |
//! | 4 | [`EfficiencyStation`] | graph metrics and recommendations |
//! | 5 | [`DynamicsStation`] | phase progression, timeline, symbolism, style |
//! | 6 | [`DiagnosticsStation`] | issues, health score, treatment plan |
//! | 7 | [`FinalReportStation`] | the plain-text final report |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod inference;
mod metrics;
mod reply;
mod report;
mod sanitize;
mod station;
mod stations;
pub mod tasks;

pub use context::StationContext;
pub use inference::{ConflictInferrer, InferenceReport, RelationshipInferrer};
pub use metrics::{
    DramaticBalance, EfficiencyMetrics, EvolutionMetrics, NarrativeEfficiency, PhaseChange,
    Redundancy, TimelineEvent, evolution_metrics, event_timeline, network_metrics,
};
pub use report::StationReport;
pub use sanitize::sanitize_plain_text;
pub use station::{DiagnosticSnapshot, Station, StationRunner, Validator};
pub use stations::{
    CharacterAnalysis, CharacterDevelopment, ConceptInput, ConceptStation, DYNAMIC_SNAPSHOT,
    Diagnostics, DiagnosticsInput, DiagnosticsStation, DynamicAnalysis, DynamicsInput,
    DynamicsStation, EfficiencyInput, EfficiencyStation, Episode, EpisodicIntegration,
    FinalReportInput, FinalReportStation, GenreContribution, INITIAL_SNAPSHOT, Issue,
    IssueCategory, NarrativeStyle, NetworkBuilderStation, NetworkInput, Recommendations,
    ReportStatistics, Station1Output, Station2Output, Station3Output, Station4Output,
    Station5Output, Station6Output, Station7Output, StylisticAnalysis, SymbolicAnalysis,
    TextAnalysisStation, TextInput, ThreeDimensionalMap, ToneStage, Treatment, TreatmentPlan,
};
