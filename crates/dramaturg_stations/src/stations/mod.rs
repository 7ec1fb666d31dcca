//! Station implementations, one module per station.

mod concept;
mod diagnostics;
mod dynamics;
mod efficiency;
mod final_report;
mod network_builder;
mod text_analysis;

pub use concept::{
    ConceptInput, ConceptStation, GenreContribution, Station2Output, ThreeDimensionalMap,
    ToneStage,
};
pub use diagnostics::{
    Diagnostics, DiagnosticsInput, DiagnosticsStation, Issue, IssueCategory, Station6Output,
    Treatment, TreatmentPlan,
};
pub use dynamics::{
    CharacterDevelopment, DYNAMIC_SNAPSHOT, DynamicAnalysis, DynamicsInput, DynamicsStation, Episode,
    EpisodicIntegration, Station5Output, StylisticAnalysis, SymbolicAnalysis,
};
pub use efficiency::{EfficiencyInput, EfficiencyStation, Recommendations, Station4Output};
pub use final_report::{FinalReportInput, FinalReportStation, ReportStatistics, Station7Output};
pub use network_builder::{INITIAL_SNAPSHOT, NetworkBuilderStation, NetworkInput, Station3Output};
pub use text_analysis::{
    CharacterAnalysis, NarrativeStyle, Station1Output, TextAnalysisStation, TextInput,
};
