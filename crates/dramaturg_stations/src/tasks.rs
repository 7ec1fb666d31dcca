//! Task identifiers written into every prompt header (`Task: <id>`).
//!
//! Scripted backends route replies on these, so they are part of the public
//! surface.

/// Station 1: list the major characters.
pub const IDENTIFY_CHARACTERS: &str = "identify_characters";
/// Station 1: deep dive on one character.
pub const CHARACTER_ANALYSIS: &str = "character_analysis";
/// Station 1: prose summary of the relationships.
pub const RELATIONSHIP_SUMMARY: &str = "relationship_summary";
/// Station 1: tone, pacing and language style.
pub const NARRATIVE_STYLE: &str = "narrative_style";

/// Station 2: one-sentence story statements.
pub const STORY_STATEMENTS: &str = "story_statements";
/// Station 2: hybrid genre labels.
pub const HYBRID_GENRES: &str = "hybrid_genres";
/// Station 2: events, meaning and time axes.
pub const THREE_D_MAP: &str = "three_d_map";
/// Station 2: elevator pitch.
pub const ELEVATOR_PITCH: &str = "elevator_pitch";
/// Station 2: contribution of each genre.
pub const GENRE_MATRIX: &str = "genre_matrix";
/// Station 2: tone per story stage.
pub const DYNAMIC_TONE: &str = "dynamic_tone";
/// Station 2: comparable works.
pub const ARTISTIC_REFERENCES: &str = "artistic_references";

/// Station 3: every relationship between the listed characters.
pub const INFER_RELATIONSHIPS: &str = "infer_relationships";
/// Station 3: every conflict among the listed characters.
pub const INFER_CONFLICTS: &str = "infer_conflicts";

/// Station 4: recommendations from the graph metrics.
pub const EFFICIENCY_RECOMMENDATIONS: &str = "efficiency_recommendations";

/// Station 5: conflict phases and character development.
pub const CONFLICT_DYNAMICS: &str = "conflict_dynamics";
/// Station 5: episode plan.
pub const EPISODIC_STRUCTURE: &str = "episodic_structure";
/// Station 5: symbols and motifs.
pub const SYMBOLIC_ANALYSIS: &str = "symbolic_analysis";
/// Station 5: tone, pacing and voice.
pub const STYLISTIC_ANALYSIS: &str = "stylistic_analysis";

/// Station 6: issues the structural checks cannot see.
pub const DIAGNOSE_ISSUES: &str = "diagnose_issues";
/// Station 6: prioritized treatments.
pub const TREATMENT_PLAN: &str = "treatment_plan";

/// Station 7: the final plain-text report.
pub const FINAL_REPORT: &str = "final_report";
