//! Test utilities for station tests.
//!
//! Scripted replies for every station task, keyed on the prompt header.

use dramaturg_core::Language;
use dramaturg_models::scripted::ScriptedGenerator;
use dramaturg_models::{ModelClient, ModelSettings};
use dramaturg_rate_limit::NoopThrottle;
use dramaturg_stations::{StationContext, tasks};
use std::sync::Arc;

/// Prompt header needle for a task.
pub fn task(id: &str) -> String {
    format!("Task: {}", id)
}

/// A short screenplay excerpt.
pub const SCREENPLAY: &str = "INT. FAMILY HOUSE - NIGHT\n\
LAYLA: Father's will names Omar, not me.\n\
OMAR: Then the house is mine, sister.\n\
SALMA: Omar, you promised we would leave this city together.";

/// Replies for every task of stations 1 to 7.
#[allow(dead_code)]
pub fn scripted_generator() -> ScriptedGenerator {
    ScriptedGenerator::new()
        .with_rule(task(tasks::IDENTIFY_CHARACTERS), r#"{"characters": ["Layla", "Omar", "Salma", "layla"]}"#)
        .with_rule(
            task(tasks::CHARACTER_ANALYSIS),
            r#"{"personality_traits": ["proud", "stubborn"], "motivations": ["justice"], "narrative_arc": "From grievance to reconciliation"}"#,
        )
        .with_rule(task(tasks::RELATIONSHIP_SUMMARY), "Layla and Omar are siblings divided by an inheritance; Salma loves Omar.")
        .with_rule(
            task(tasks::NARRATIVE_STYLE),
            r#"```json
{"overall_tone": "tragic", "pacing": "measured", "language_style": "poetic"}
```"#,
        )
        .with_rule(task(tasks::STORY_STATEMENTS), r#"{"story_statements": ["A will splits a family."]}"#)
        .with_rule(task(tasks::HYBRID_GENRES), r#"{"hybrid_genres": ["family drama", "thriller"]}"#)
        .with_rule(
            task(tasks::THREE_D_MAP),
            r#"{"events_axis": "The will is read", "meaning_axis": "Justice versus loyalty", "temporal_axis": "One night"}"#,
        )
        .with_rule(task(tasks::ELEVATOR_PITCH), "When a will disinherits her, Layla must choose between the house and her brother.")
        .with_rule(
            task(tasks::GENRE_MATRIX),
            r#"{"genre_matrix": [{"genre": "family drama", "contribution": "core conflict", "weight": 0.7}, {"genre": "thriller", "contribution": "suspense", "weight": "0.3"}]}"#,
        )
        .with_rule(task(tasks::DYNAMIC_TONE), r#"[{"stage": "opening", "tone": "tense"}, {"stage": "ending", "tone": "bittersweet"}]"#)
        .with_rule(task(tasks::ARTISTIC_REFERENCES), r#"{"artistic_references": ["King Lear"]}"#)
        .with_rule(
            task(tasks::INFER_RELATIONSHIPS),
            r#"{"relationships": [
                {"source": "Layla", "target": "Omar", "type": "family", "nature": "conflictual", "strength": 8},
                {"source": "omar", "target": "Salma", "type": "romantic", "nature": "supportive", "strength": "6"},
                {"source": "Layla", "target": "Ghost", "type": "friendship"},
                {"source": "Salma", "target": "SALMA", "type": "other"}
            ]}"#,
        )
        .with_rule(
            task(tasks::INFER_CONFLICTS),
            r#"{"conflicts": [
                {"name": "The inheritance", "involved_characters": ["Layla", "Omar"], "subject": "inheritance", "scope": "interpersonal", "phase": "emerging", "strength": 9},
                {"name": "Phantom feud", "involved_characters": ["Ghost"]}
            ]}"#,
        )
        .with_rule(
            task(tasks::EFFICIENCY_RECOMMENDATIONS),
            r#"{"priority_actions": ["Raise the stakes for Salma"], "quick_fixes": ["Trim the opening"], "structural_revisions": ["Merge the two will scenes"]}"#,
        )
        .with_rule(
            task(tasks::CONFLICT_DYNAMICS),
            r#"{"phase_updates": [{"conflict_id": "conf_000001", "phase": "climax"}, {"conflict_id": "conf_999", "phase": "resolution"}], "character_development": [{"character": "Layla", "development": "Learns to forgive"}]}"#,
        )
        .with_rule(
            task(tasks::EPISODIC_STRUCTURE),
            r#"{"episodes": [{"number": 1, "title": "The Will", "summary": "The family gathers."}, {"title": "The House", "summary": "Omar claims it."}], "structure_notes": "Two movements"}"#,
        )
        .with_rule(
            task(tasks::SYMBOLIC_ANALYSIS),
            r#"{"key_symbols": ["the house"], "recurring_motifs": ["locked doors"], "interpretation": "Belonging as property", "depth_score": 8, "consistency_score": 12}"#,
        )
        .with_rule(
            task(tasks::STYLISTIC_ANALYSIS),
            r#"{"tone_assessment": "Controlled", "pacing_assessment": "Slow start", "voice_consistency": "Consistent", "recommendations": ["Sharpen dialogue"]}"#,
        )
        .with_rule(
            task(tasks::DIAGNOSE_ISSUES),
            r#"{"issues": [{"category": "warning", "description": "Salma lacks agency", "severity": 5, "suggested_fix": "Give her a choice", "affected": ["Salma"]}]}"#,
        )
        .with_rule(
            task(tasks::TREATMENT_PLAN),
            r#"{"treatments": [
                {"priority": 2, "issue": "Latent conflicts", "action": "Surface them", "expected_impact": "More tension"},
                {"priority": 1, "issue": "Salma lacks agency", "action": "Give her a choice", "expected_impact": "Stronger third act"}
            ], "summary": "Empower Salma first."}"#,
        )
        .with_rule(
            task(tasks::FINAL_REPORT),
            "## Final Report\n\n**Layla** carries the story with conviction.\n\n\n\n- The inheritance conflict is strong.\n1. Salma needs agency.",
        )
}

/// Context over a scripted generator with no throttling.
#[allow(dead_code)]
pub fn context(generator: Arc<ScriptedGenerator>, language: Language) -> StationContext {
    let client = ModelClient::new(
        generator,
        Arc::new(NoopThrottle),
        ModelSettings::new("mock-primary", Some("mock-fallback".to_string())),
    );
    StationContext::new(Arc::new(client), language, 60_000)
}
