//! Screenplay analysis command handler.

use super::AnalyzeArgs;
use anyhow::Context;
use dramaturg::{
    DramaturgConfig, PipelineInput, PipelineOrchestrator, PipelineSettings, gemini_client,
};
use std::path::Path;

/// Run the seven stations on `args.file` and print a summary.
#[tracing::instrument(skip_all, fields(file = %args.file.display()))]
pub async fn analyze(args: AnalyzeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => DramaturgConfig::from_file(path)?,
        None => DramaturgConfig::load()?,
    };

    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let project = args.project.clone().unwrap_or_else(|| {
        args.file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string())
    });

    let mut settings = PipelineSettings::from(&config.pipeline);
    if args.no_delay {
        settings = settings.without_delay();
    }
    if let Some(output) = &args.output {
        settings = settings.with_output_dir(output);
    }

    let input = PipelineInput::new(text)?
        .with_project_name(project)
        .with_language(args.language);

    let orchestrator = PipelineOrchestrator::new(gemini_client(&config)?, settings);
    let result = orchestrator.run(input).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let metadata = &result.pipeline_metadata;
    println!(
        "{}: {} of 7 stations completed in {:.1}s",
        metadata.project_name,
        metadata.stages_completed,
        metadata.total_execution_time_ms as f64 / 1000.0
    );
    for summary in result.station_results.values() {
        println!(
            "  {}. {:<40} {:>8} {:>7}ms",
            summary.station, summary.name, summary.status, summary.execution_time_ms
        );
        if let Some(error) = &summary.error {
            println!("     {}", error);
        }
    }
    if metadata.artifacts.is_empty() {
        println!("\n{}", result.station_outputs.station7.final_report);
    } else {
        println!("\nArtifacts:");
        for artifact in &metadata.artifacts {
            println!("  {}", artifact);
        }
    }

    Ok(())
}
