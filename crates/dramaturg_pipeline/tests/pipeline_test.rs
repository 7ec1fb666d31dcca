//! End-to-end pipeline runs against scripted model replies.

mod test_utils;

use dramaturg_core::{Language, StageStatus, truncate_chars};
use dramaturg_error::{DramaturgError, DramaturgErrorKind, PipelineErrorKind};
use dramaturg_models::scripted::ScriptedGenerator;
use dramaturg_pipeline::{PipelineInput, PipelineSettings, StationState};
use dramaturg_stations::{DYNAMIC_SNAPSHOT, INITIAL_SNAPSHOT, tasks};
use dramaturg_storage::{FINAL_REPORT_FILE, INDEX_FILE, RESULT_FILE, ReportStore};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{
    ARABIC_SCREENPLAY, SCREENPLAY, arabic_generator, fast_settings, orchestrator, request,
    scripted_generator, task,
};

fn pipeline_kind(err: &DramaturgError) -> PipelineErrorKind {
    match err.kind() {
        DramaturgErrorKind::Pipeline(e) => e.kind.clone(),
        other => panic!("expected a pipeline error, got {other}"),
    }
}

#[tokio::test]
async fn test_full_run_completes_every_station() -> anyhow::Result<()> {
    let generator = Arc::new(scripted_generator());
    let orchestrator = orchestrator(generator, fast_settings());

    let result = orchestrator.run_full_analysis(request()).await?;

    let metadata = &result.pipeline_metadata;
    assert_eq!(metadata.stages_completed, 7);
    assert_eq!(metadata.project_name, "The Harbour");
    assert_eq!(metadata.language, Language::En);
    assert!(metadata.finished_at >= metadata.started_at);
    assert!(metadata.artifacts.is_empty());
    assert_eq!(result.station_results.len(), 7);
    assert!(result.failed_stations().is_empty());

    let outputs = &result.station_outputs;
    assert_eq!(
        outputs.station3.network_summary.characters_count,
        outputs.station1.major_characters.len()
    );
    assert_eq!(outputs.station3.network_summary.relationships_count, 2);
    assert!(!outputs.station7.final_report.contains('#'));

    assert!(
        orchestrator
            .station_states()
            .values()
            .all(|state| *state == StationState::Completed)
    );
    Ok(())
}

#[tokio::test]
async fn test_arabic_run_with_default_language() -> anyhow::Result<()> {
    assert!(ARABIC_SCREENPLAY.chars().count() > 500);
    let generator = Arc::new(arabic_generator());
    let settings = PipelineSettings::builder()
        .inter_stage_delay(Duration::ZERO)
        .max_text_chars(240)
        .build()?;
    let orchestrator = orchestrator(generator.clone(), settings);

    let result = orchestrator
        .run_full_analysis(json!({ "fullText": ARABIC_SCREENPLAY, "projectName": "الميراث" }))
        .await?;

    let metadata = &result.pipeline_metadata;
    assert_eq!(metadata.stages_completed, 7);
    assert_eq!(metadata.language, Language::Ar);
    assert_eq!(metadata.project_name, "الميراث");

    let outputs = &result.station_outputs;
    assert_eq!(outputs.station1.major_characters, vec!["ليلى", "عمر", "سلمى"]);
    assert_eq!(
        outputs.station3.network_summary.characters_count,
        outputs.station1.major_characters.len()
    );
    assert_eq!(outputs.station3.network_summary.conflicts_count, 1);

    // The stylistic section got no usable reply.
    assert_eq!(outputs.station5.stylistic_analysis.tone_assessment, "غير محدد");
    assert_eq!(outputs.station5.stylistic_analysis.recommendations, vec!["N/A"]);
    assert_eq!(result.station_results[&5].status, StageStatus::Partial);

    let report = &outputs.station7.final_report;
    assert!(report.starts_with("التقرير النهائي"));
    assert!(!report.contains('#') && !report.contains("**"));

    let calls = generator.calls();
    assert!(calls.iter().all(|call| call.prompt().contains("Arabic")));
    let excerpt = truncate_chars(ARABIC_SCREENPLAY, 240).trim();
    assert!(calls.iter().any(|call| call.prompt().contains(excerpt)));
    assert!(calls.iter().all(|call| !call.prompt().contains(ARABIC_SCREENPLAY)));
    Ok(())
}

#[tokio::test]
async fn test_result_serializes_transport_shape() -> anyhow::Result<()> {
    let orchestrator = orchestrator(Arc::new(scripted_generator()), fast_settings());

    let result = orchestrator.run_full_analysis(request()).await?;
    let value = serde_json::to_value(&result)?;

    assert_eq!(value["pipelineMetadata"]["stagesCompleted"], 7);
    assert_eq!(value["stationOutputs"]["station3"]["networkSummary"]["charactersCount"], 3);
    assert_eq!(value["stationResults"]["1"]["status"], "success");
    let characters = value["stationOutputs"]["station3"]["network"]["characters"]
        .as_object()
        .map(|map| map.keys().cloned().collect::<Vec<_>>())
        .unwrap_or_default();
    assert_eq!(characters, vec!["char_000001", "char_000002", "char_000003"]);
    Ok(())
}

#[tokio::test]
async fn test_station5_network_is_adopted_without_touching_station3() -> anyhow::Result<()> {
    let orchestrator = orchestrator(Arc::new(scripted_generator()), fast_settings());

    let result = orchestrator.run_full_analysis(request()).await?;

    let station3 = &result.station_outputs.station3.network;
    assert_eq!(station3.snapshots().len(), 1);
    assert_eq!(station3.snapshots()[0].description(), INITIAL_SNAPSHOT);

    let adopted = result
        .station_outputs
        .station5
        .network
        .as_ref()
        .expect("station 5 returns its network");
    assert_eq!(adopted.snapshots().len(), 2);
    assert_eq!(adopted.snapshots()[1].description(), DYNAMIC_SNAPSHOT);
    Ok(())
}

#[tokio::test]
async fn test_invalid_input_runs_nothing() -> anyhow::Result<()> {
    let generator = Arc::new(scripted_generator());
    let orchestrator = orchestrator(generator.clone(), fast_settings());

    let err = orchestrator
        .run_full_analysis(json!({ "projectName": "Empty", "fullText": "   " }))
        .await
        .unwrap_err();

    assert!(matches!(pipeline_kind(&err), PipelineErrorKind::InvalidInput(_)));
    assert_eq!(generator.call_count(), 0);
    assert!(
        orchestrator
            .station_states()
            .values()
            .all(|state| *state == StationState::Pending)
    );
    Ok(())
}

#[tokio::test]
async fn test_panicking_station_aborts_the_run() -> anyhow::Result<()> {
    let generator = Arc::new(scripted_generator().panicking_on(task(tasks::SYMBOLIC_ANALYSIS)));
    let orchestrator = orchestrator(generator.clone(), fast_settings());

    let err = orchestrator.run_full_analysis(request()).await.unwrap_err();

    match pipeline_kind(&err) {
        PipelineErrorKind::StageAborted { station, message } => {
            assert_eq!(station, 5);
            assert!(message.contains("scripted panic"));
        }
        other => panic!("unexpected kind {other}"),
    }

    let states = orchestrator.station_states();
    for station in 1..=4 {
        assert_eq!(states[&station], StationState::Completed);
    }
    assert_eq!(states[&5], StationState::Error);
    assert_eq!(states[&6], StationState::Pending);
    assert_eq!(states[&7], StationState::Pending);
    assert_eq!(generator.calls_matching(&task(tasks::DIAGNOSE_ISSUES)), 0);
    Ok(())
}

#[tokio::test]
async fn test_backend_outage_is_contained() -> anyhow::Result<()> {
    let generator = Arc::new(
        ScriptedGenerator::new()
            .failing_for("mock-primary")
            .failing_for("mock-fallback"),
    );
    let orchestrator = orchestrator(generator, fast_settings());

    let result = orchestrator.run(PipelineInput::new(SCREENPLAY)?).await?;

    assert_eq!(result.pipeline_metadata.stages_completed, 7);
    assert_eq!(result.pipeline_metadata.project_name, "untitled");
    let failed = result.failed_stations();
    for station in [1, 3, 7] {
        assert!(failed.contains(&station), "station {station} should have failed");
    }
    assert_eq!(result.station_outputs.station7.final_report, "غير محدد");
    assert!(result.station_outputs.station3.network.is_empty());
    assert_eq!(result.station_results[&1].status, StageStatus::Failed);
    assert!(result.station_results[&1].error.is_some());
    Ok(())
}

#[tokio::test]
async fn test_run_overrides_reach_the_backend() -> anyhow::Result<()> {
    let generator = Arc::new(scripted_generator());
    let orchestrator = orchestrator(generator.clone(), fast_settings());

    orchestrator
        .run_full_analysis(json!({
            "text": SCREENPLAY,
            "language": "en",
            "model": "override-model",
            "fallbackModel": "override-fallback",
        }))
        .await?;

    let models = generator.models_called();
    assert!(!models.is_empty());
    assert!(models.iter().all(|model| model == "override-model"));
    Ok(())
}

#[tokio::test]
async fn test_artifacts_written_to_output_dir() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = fast_settings().with_output_dir(dir.path().join("harbour"));
    let orchestrator = orchestrator(Arc::new(scripted_generator()), settings);

    let result = orchestrator.run_full_analysis(request()).await?;

    let out = dir.path().join("harbour");
    for station in 1..=6 {
        let report = std::fs::read_to_string(out.join(ReportStore::station_file_name(station)))?;
        assert!(report.starts_with(&format!("Station {}:", station)));
    }
    let final_report = std::fs::read_to_string(out.join(FINAL_REPORT_FILE))?;
    assert_eq!(final_report, result.station_outputs.station7.final_report);
    assert_eq!(
        result.station_outputs.station7.report_path.as_deref(),
        Some(out.join(FINAL_REPORT_FILE).display().to_string().as_str())
    );

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join(RESULT_FILE))?)?;
    assert_eq!(saved["pipelineMetadata"]["stagesCompleted"], 7);

    let index = std::fs::read_to_string(out.join(INDEX_FILE))?;
    assert!(index.contains("Project: The Harbour"));
    assert!(index.contains(RESULT_FILE));

    assert_eq!(result.pipeline_metadata.artifacts.len(), 9);
    Ok(())
}

#[tokio::test]
async fn test_explicit_report_store_wins() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ReportStore::new(dir.path())?;
    let orchestrator =
        orchestrator(Arc::new(scripted_generator()), fast_settings()).with_report_store(store);

    let result = orchestrator.run_full_analysis(request()).await?;

    assert!(dir.path().join(RESULT_FILE).exists());
    assert_eq!(result.station_results[&7].status, StageStatus::Success);
    Ok(())
}

#[tokio::test]
async fn test_unusable_output_dir_aborts_final_station() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "occupied")?;
    let settings = fast_settings().with_output_dir(blocker.join("reports"));
    let orchestrator = orchestrator(Arc::new(scripted_generator()), settings);

    let err = orchestrator.run_full_analysis(request()).await.unwrap_err();

    assert!(matches!(
        pipeline_kind(&err),
        PipelineErrorKind::StageAborted { station: 7, .. }
    ));
    let states = orchestrator.station_states();
    assert_eq!(states[&6], StationState::Completed);
    assert_eq!(states[&7], StationState::Error);
    Ok(())
}

#[tokio::test]
async fn test_inter_stage_delay_follows_stations_one_to_six() -> anyhow::Result<()> {
    let settings = PipelineSettings::builder()
        .inter_stage_delay(Duration::from_millis(20))
        .build()?;
    let orchestrator = orchestrator(Arc::new(scripted_generator()), settings);

    let result = orchestrator.run_full_analysis(request()).await?;

    assert!(result.pipeline_metadata.total_execution_time_ms >= 120);
    Ok(())
}
