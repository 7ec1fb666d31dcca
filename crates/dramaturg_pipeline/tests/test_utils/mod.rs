//! Test utilities for pipeline tests.

use dramaturg_models::scripted::ScriptedGenerator;
use dramaturg_models::{ModelClient, ModelSettings};
use dramaturg_pipeline::{PipelineOrchestrator, PipelineSettings};
use dramaturg_rate_limit::NoopThrottle;
use dramaturg_stations::tasks;
use serde_json::{Value, json};
use std::sync::Arc;

/// Prompt header needle for a task.
pub fn task(id: &str) -> String {
    format!("Task: {}", id)
}

/// A short two-hander with a witness.
pub const SCREENPLAY: &str = "EXT. HARBOUR - DAWN\n\
NADIA: You sold the boat without asking me.\n\
KARIM: The debt would have sunk us both.\n\
YOUSSEF (watching from the pier): He is lying to her again.";

/// A request naming the screenplay through an alias.
#[allow(dead_code)]
pub fn request() -> Value {
    json!({
        "screenplayText": SCREENPLAY,
        "title": "The Harbour",
        "language": "en",
    })
}

/// Structured replies for every task of a run.
#[allow(dead_code)]
pub fn scripted_generator() -> ScriptedGenerator {
    ScriptedGenerator::new()
        .with_rule(task(tasks::IDENTIFY_CHARACTERS), r#"{"characters": ["Nadia", "Karim", "Youssef"]}"#)
        .with_rule(
            task(tasks::CHARACTER_ANALYSIS),
            r#"{"personality_traits": ["guarded"], "motivations": ["keep the family afloat"], "narrative_arc": "From secrecy to confession"}"#,
        )
        .with_rule(task(tasks::RELATIONSHIP_SUMMARY), "Nadia and Karim are partners strained by debt; Youssef sees through Karim.")
        .with_rule(task(tasks::NARRATIVE_STYLE), r#"{"overall_tone": "brooding", "pacing": "tight", "language_style": "spare"}"#)
        .with_rule(task(tasks::STORY_STATEMENTS), r#"{"story_statements": ["A secret sale sinks a marriage."]}"#)
        .with_rule(task(tasks::HYBRID_GENRES), r#"{"hybrid_genres": ["marital drama", "noir"]}"#)
        .with_rule(
            task(tasks::THREE_D_MAP),
            r#"{"events_axis": "The boat is sold", "meaning_axis": "Trust versus survival", "temporal_axis": "A single dawn"}"#,
        )
        .with_rule(task(tasks::ELEVATOR_PITCH), "A fisherman's secret sale forces his wife to choose between the debt and the truth.")
        .with_rule(
            task(tasks::GENRE_MATRIX),
            r#"{"genre_matrix": [{"genre": "marital drama", "contribution": "core", "weight": 0.6}]}"#,
        )
        .with_rule(task(tasks::DYNAMIC_TONE), r#"{"dynamic_tone": [{"stage": "opening", "tone": "cold"}]}"#)
        .with_rule(task(tasks::ARTISTIC_REFERENCES), r#"{"artistic_references": ["On the Waterfront"]}"#)
        .with_rule(
            task(tasks::INFER_RELATIONSHIPS),
            r#"{"relationships": [
                {"source": "Nadia", "target": "Karim", "type": "romantic", "nature": "conflictual", "strength": 9},
                {"source": "Youssef", "target": "Karim", "type": "friendship", "nature": "neutral", "strength": 4}
            ]}"#,
        )
        .with_rule(
            task(tasks::INFER_CONFLICTS),
            r#"{"conflicts": [{"name": "The sale", "involved_characters": ["Nadia", "Karim"], "subject": "money", "scope": "interpersonal", "phase": "escalating", "strength": 8}]}"#,
        )
        .with_rule(
            task(tasks::EFFICIENCY_RECOMMENDATIONS),
            r#"{"priority_actions": ["Let Youssef intervene"], "quick_fixes": [], "structural_revisions": []}"#,
        )
        .with_rule(
            task(tasks::CONFLICT_DYNAMICS),
            r#"{"phase_updates": [{"conflict_id": "conf_000001", "phase": "climax"}], "character_development": [{"character": "Nadia", "development": "Takes the helm"}]}"#,
        )
        .with_rule(
            task(tasks::EPISODIC_STRUCTURE),
            r#"{"episodes": [{"number": 1, "title": "Dawn", "summary": "The sale comes out."}], "structure_notes": "Single episode"}"#,
        )
        .with_rule(
            task(tasks::SYMBOLIC_ANALYSIS),
            r#"{"key_symbols": ["the boat"], "recurring_motifs": ["tides"], "interpretation": "Livelihood as marriage", "depth_score": 7, "consistency_score": 6}"#,
        )
        .with_rule(
            task(tasks::STYLISTIC_ANALYSIS),
            r#"{"tone_assessment": "Restrained", "pacing_assessment": "Brisk", "voice_consistency": "Even", "recommendations": []}"#,
        )
        .with_rule(task(tasks::DIAGNOSE_ISSUES), r#"{"issues": []}"#)
        .with_rule(
            task(tasks::TREATMENT_PLAN),
            r#"{"treatments": [{"priority": 1, "issue": "Youssef is passive", "action": "Give him a scene", "expected_impact": "A third voice"}], "summary": "Activate the witness."}"#,
        )
        .with_rule(
            task(tasks::FINAL_REPORT),
            "# Report\n\nThe Harbour is a compact marital drama.\n\nIts central conflict escalates cleanly.",
        )
}

/// An Arabic family drama excerpt of roughly six hundred characters.
#[allow(dead_code)]
pub const ARABIC_SCREENPLAY: &str = "داخلي. بيت العائلة القديم - ليلاً\n\
ليلى: قرأ المحامي الوصية أمامنا جميعاً، وأبي ترك البيت لعمر وحده. كيف يفعل هذا بي بعد كل السنوات التي قضيتها أرعاه؟\n\
عمر: لم أطلب شيئاً يا أختي. البيت جاءني كما جاء، ولن أتخلى عنه لأن ضميرك يؤلمك الآن.\n\
سلمى: عمر، وعدتني أن نترك هذه المدينة معاً قبل نهاية الصيف. هل كان الوعد كذبة أخرى؟\n\
عمر: الوعد قائم يا سلمى، لكن البيت يحتاجني الآن أكثر مما تحتاجينني.\n\
ليلى: البيت لا يحتاج أحداً. أنت من يحتاج جدرانه ليختبئ خلفها من كل ما لم تقله لنا.\n\
خارجي. الحديقة - فجراً\n\
سلمى تجلس وحيدة على الدرج، تمسك مفتاح البيت القديم وتنظر إلى البحر البعيد.";

/// Arabic replies for every task except the stylistic analysis, which
/// gets an empty object.
#[allow(dead_code)]
pub fn arabic_generator() -> ScriptedGenerator {
    ScriptedGenerator::new()
        .with_rule(task(tasks::IDENTIFY_CHARACTERS), r#"{"characters": ["ليلى", "عمر", "سلمى"]}"#)
        .with_rule(
            task(tasks::CHARACTER_ANALYSIS),
            r#"{"personality_traits": ["عنيدة", "وفية"], "motivations": ["العدالة"], "narrative_arc": "من الغضب إلى المصالحة"}"#,
        )
        .with_rule(task(tasks::RELATIONSHIP_SUMMARY), "ليلى وعمر أخوان فرقتهما الوصية، وسلمى تحب عمر.")
        .with_rule(
            task(tasks::NARRATIVE_STYLE),
            r#"{"overall_tone": "مأساوي", "pacing": "متأنٍ", "language_style": "شاعري"}"#,
        )
        .with_rule(task(tasks::STORY_STATEMENTS), r#"{"story_statements": ["وصية تمزق عائلة."]}"#)
        .with_rule(task(tasks::HYBRID_GENRES), r#"{"hybrid_genres": ["دراما عائلية"]}"#)
        .with_rule(
            task(tasks::THREE_D_MAP),
            r#"{"events_axis": "قراءة الوصية", "meaning_axis": "العدل مقابل الولاء", "temporal_axis": "ليلة واحدة"}"#,
        )
        .with_rule(task(tasks::ELEVATOR_PITCH), "حين تحرمها الوصية من البيت، تختار ليلى بين الحق والأخوة.")
        .with_rule(
            task(tasks::GENRE_MATRIX),
            r#"{"genre_matrix": [{"genre": "دراما عائلية", "contribution": "الصراع الرئيسي", "weight": 1.0}]}"#,
        )
        .with_rule(task(tasks::DYNAMIC_TONE), r#"{"dynamic_tone": [{"stage": "البداية", "tone": "متوتر"}]}"#)
        .with_rule(task(tasks::ARTISTIC_REFERENCES), r#"{"artistic_references": ["الملك لير"]}"#)
        .with_rule(
            task(tasks::INFER_RELATIONSHIPS),
            r#"{"relationships": [
                {"source": "ليلى", "target": "عمر", "type": "family", "nature": "conflictual", "strength": 8},
                {"source": "عمر", "target": "سلمى", "type": "romantic", "nature": "ambiguous", "strength": 6}
            ]}"#,
        )
        .with_rule(
            task(tasks::INFER_CONFLICTS),
            r#"{"conflicts": [{"name": "الميراث", "involved_characters": ["ليلى", "عمر"], "subject": "resources", "scope": "interpersonal", "phase": "escalating", "strength": 9}]}"#,
        )
        .with_rule(
            task(tasks::EFFICIENCY_RECOMMENDATIONS),
            r#"{"priority_actions": ["منح سلمى قراراً حاسماً"], "quick_fixes": [], "structural_revisions": []}"#,
        )
        .with_rule(
            task(tasks::CONFLICT_DYNAMICS),
            r#"{"phase_updates": [{"conflict_id": "conf_000001", "phase": "ذروة"}], "character_development": [{"character": "ليلى", "development": "تتعلم الصفح"}]}"#,
        )
        .with_rule(
            task(tasks::EPISODIC_STRUCTURE),
            r#"{"episodes": [{"number": 1, "title": "الوصية", "summary": "تجتمع العائلة."}], "structure_notes": "حلقة واحدة"}"#,
        )
        .with_rule(
            task(tasks::SYMBOLIC_ANALYSIS),
            r#"{"key_symbols": ["المفتاح"], "recurring_motifs": ["البحر"], "interpretation": "الانتماء بوصفه ملكية", "depth_score": 7, "consistency_score": 7}"#,
        )
        .with_rule(task(tasks::DIAGNOSE_ISSUES), r#"{"issues": []}"#)
        .with_rule(
            task(tasks::TREATMENT_PLAN),
            r#"{"treatments": [{"priority": 1, "issue": "سلمى سلبية", "action": "امنحها مشهداً", "expected_impact": "صوت ثالث"}], "summary": "تفعيل سلمى أولاً."}"#,
        )
        .with_rule(
            task(tasks::FINAL_REPORT),
            "## التقرير النهائي\n\n**ليلى** تحمل الحكاية بثبات.\n\n- صراع الميراث متماسك.",
        )
        .with_default("{}")
}

/// Orchestrator over `generator` with no throttling and no pauses.
#[allow(dead_code)]
pub fn orchestrator(generator: Arc<ScriptedGenerator>, settings: PipelineSettings) -> PipelineOrchestrator {
    let client = ModelClient::new(
        generator,
        Arc::new(NoopThrottle),
        ModelSettings::new("mock-primary", Some("mock-fallback".to_string())),
    );
    PipelineOrchestrator::new(Arc::new(client), settings)
}

/// Settings with no pause between stations and no artifacts.
#[allow(dead_code)]
pub fn fast_settings() -> PipelineSettings {
    PipelineSettings::default().without_delay()
}
