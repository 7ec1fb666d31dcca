//! Sequential execution of the seven stations.

use crate::{
    PipelineInput, PipelineMetadata, PipelineRunResult, PipelineSettings, StageSummary,
    StationOutputs, StationState,
};
use chrono::Utc;
use dramaturg_core::StageResult;
use dramaturg_error::{DramaturgResult, PipelineError, PipelineErrorKind};
use dramaturg_models::ModelClient;
use dramaturg_stations::{
    ConceptInput, ConceptStation, DiagnosticsInput, DiagnosticsStation, DynamicsInput,
    DynamicsStation, EfficiencyInput, EfficiencyStation, FinalReportInput, FinalReportStation,
    NetworkBuilderStation, NetworkInput, Station, Station3Output, StationContext, StationReport,
    StationRunner, TextAnalysisStation, TextInput,
};
use dramaturg_storage::{INDEX_FILE, RESULT_FILE, ReportStore};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Number of stations in a run.
const STATION_COUNT: u8 = 7;

/// Every relationship and conflict must reference known characters.
fn check_network_integrity(output: &Station3Output) -> Result<(), String> {
    let network = &output.network;
    for relationship in network.relationships().values() {
        for id in [relationship.source(), relationship.target()] {
            if network.character(id).is_none() {
                return Err(format!(
                    "relationship {} references unknown character {}",
                    relationship.id(),
                    id
                ));
            }
        }
    }
    for conflict in network.conflicts().values() {
        if let Some(id) = conflict
            .involved_characters()
            .iter()
            .find(|id| network.character(id).is_none())
        {
            return Err(format!(
                "conflict {} references unknown character {}",
                conflict.id(),
                id
            ));
        }
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "station panicked".to_string())
}

/// Runs the seven stations in order and aggregates their results.
///
/// Station failures are contained by [`StationRunner`] and show up as
/// `failed` entries in the result. Only invalid input, a panic escaping a
/// station, or a station that cannot be constructed abort the run.
#[derive(Debug)]
pub struct PipelineOrchestrator {
    client: Arc<ModelClient>,
    settings: PipelineSettings,
    store: Option<ReportStore>,
    states: Mutex<BTreeMap<u8, StationState>>,
}

impl PipelineOrchestrator {
    /// Orchestrator over a shared model client.
    ///
    /// Artifacts are written when `settings` names an output directory.
    pub fn new(client: Arc<ModelClient>, settings: PipelineSettings) -> Self {
        Self {
            client,
            settings,
            store: None,
            states: Mutex::new(Self::pending()),
        }
    }

    /// Write artifacts through `store`, overriding the settings' directory.
    pub fn with_report_store(mut self, store: ReportStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Pacing and artifact settings.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Progress of every station in the current or last run.
    pub fn station_states(&self) -> BTreeMap<u8, StationState> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn pending() -> BTreeMap<u8, StationState> {
        (1..=STATION_COUNT)
            .map(|station| (station, StationState::Pending))
            .collect()
    }

    fn set_state(&self, station: u8, state: StationState) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(station, state);
    }

    fn reset_states(&self) {
        *self.states.lock().unwrap_or_else(PoisonError::into_inner) = Self::pending();
    }

    fn completed_count(&self) -> usize {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|state| **state == StationState::Completed)
            .count()
    }

    /// Mark `station` as errored and build the abort error.
    #[track_caller]
    fn abort(&self, station: u8, message: String) -> PipelineError {
        self.set_state(station, StationState::Error);
        error!(station, error = %message, "Station aborted the run");
        PipelineError::new(PipelineErrorKind::StageAborted { station, message })
    }

    fn context(&self, input: &PipelineInput) -> StationContext {
        StationContext::new(
            self.client.clone(),
            *input.language(),
            *self.settings.max_text_chars(),
        )
        .with_temperature(*input.temperature())
        .with_models(input.model().clone(), input.fallback_model().clone())
    }

    fn resolve_store(&self) -> DramaturgResult<Option<ReportStore>> {
        match (&self.store, self.settings.output_dir()) {
            (Some(store), _) => Ok(Some(store.clone())),
            (None, Some(dir)) => ReportStore::new(dir.clone()).map(Some),
            (None, None) => Ok(None),
        }
    }

    async fn pause(&self) {
        let delay = *self.settings.inter_stage_delay();
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "Pausing between stations");
            tokio::time::sleep(delay).await;
        }
    }

    /// Run one station, turning an escaping panic into an abort.
    async fn stage<S: Station>(
        &self,
        runner: StationRunner<S>,
        input: &S::Input,
    ) -> Result<StageResult<S::Output>, PipelineError> {
        let station = S::NUMBER;
        self.set_state(station, StationState::Running);
        info!(station, name = runner.station().name(), "Station started");

        match AssertUnwindSafe(runner.execute(input)).catch_unwind().await {
            Ok(result) => {
                self.set_state(station, StationState::Completed);
                info!(
                    station,
                    status = %result.status(),
                    elapsed_ms = *result.execution_time_ms(),
                    "Station finished"
                );
                Ok(result)
            }
            Err(panic) => Err(self.abort(station, panic_message(panic.as_ref()))),
        }
    }

    /// Normalise a raw JSON request and run the full analysis.
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineErrorKind::InvalidInput`] for a malformed request
    /// and [`PipelineErrorKind::StageAborted`] when a station panics or
    /// cannot be constructed.
    pub async fn run_full_analysis(&self, raw: Value) -> DramaturgResult<PipelineRunResult> {
        let input = PipelineInput::from_value(raw)?;
        self.run(input).await
    }

    /// Run the full analysis on a validated request.
    ///
    /// # Errors
    ///
    /// Fails with [`PipelineErrorKind::StageAborted`] when a station panics
    /// or cannot be constructed.
    #[instrument(skip_all, fields(project = %input.project_name(), language = %input.language()))]
    pub async fn run(&self, input: PipelineInput) -> DramaturgResult<PipelineRunResult> {
        self.reset_states();
        let started_at = Utc::now();
        let started = Instant::now();
        let ctx = self.context(&input);
        let text = input.full_text().clone();
        let project_name = input.project_name().clone();
        info!(chars = text.chars().count(), "Pipeline run started");

        let station1 = self
            .stage(
                StationRunner::new(TextAnalysisStation::new(ctx.clone())),
                &TextInput {
                    text: text.clone(),
                    project_name: project_name.clone(),
                },
            )
            .await?;
        self.pause().await;

        let station2 = self
            .stage(
                StationRunner::new(ConceptStation::new(ctx.clone())),
                &ConceptInput {
                    text: text.clone(),
                    station1: station1.output().clone(),
                },
            )
            .await?;
        self.pause().await;

        let station3 = self
            .stage(
                StationRunner::new(NetworkBuilderStation::new(ctx.clone()))
                    .with_output_validator(check_network_integrity),
                &NetworkInput {
                    text: text.clone(),
                    project_name: project_name.clone(),
                    station1: station1.output().clone(),
                },
            )
            .await?;
        self.pause().await;

        let mut network = station3.output().network.clone();

        let station4 = self
            .stage(
                StationRunner::new(EfficiencyStation::new(ctx.clone())),
                &EfficiencyInput {
                    network: network.clone(),
                },
            )
            .await?;
        self.pause().await;

        let station5 = self
            .stage(
                StationRunner::new(DynamicsStation::new(ctx.clone())),
                &DynamicsInput {
                    text: text.clone(),
                    network: network.clone(),
                    station2: station2.output().clone(),
                },
            )
            .await?;
        self.pause().await;

        if station5.is_usable()
            && let Some(updated) = &station5.output().network
        {
            network = updated.clone();
            debug!(snapshots = network.snapshots().len(), "Adopted network from station 5");
        }

        let station6 = self
            .stage(
                StationRunner::new(DiagnosticsStation::new(ctx.clone())),
                &DiagnosticsInput {
                    network: network.clone(),
                    station4: station4.output().clone(),
                    station5: station5.output().clone(),
                },
            )
            .await?;
        self.pause().await;

        let store = self
            .resolve_store()
            .map_err(|err| self.abort(FinalReportStation::NUMBER, err.to_string()))?;
        let final_station = match &store {
            Some(store) => FinalReportStation::with_store(ctx.clone(), store.clone()),
            None => FinalReportStation::new(ctx.clone()),
        };

        let mut report_network = station3.output().clone();
        report_network.network_summary = network.summary();
        report_network.network = network;

        let station7 = self
            .stage(
                StationRunner::new(final_station),
                &FinalReportInput {
                    project_name: project_name.clone(),
                    station1: station1.output().clone(),
                    station2: station2.output().clone(),
                    station3: report_network,
                    station4: station4.output().clone(),
                    station5: station5.output().clone(),
                    station6: station6.output().clone(),
                },
            )
            .await?;

        let station_results: BTreeMap<u8, StageSummary> = [
            StageSummary::from(&station1),
            StageSummary::from(&station2),
            StageSummary::from(&station3),
            StageSummary::from(&station4),
            StageSummary::from(&station5),
            StageSummary::from(&station6),
            StageSummary::from(&station7),
        ]
        .into_iter()
        .map(|summary| (summary.station, summary))
        .collect();

        let mut result = PipelineRunResult {
            station_outputs: StationOutputs {
                station1: station1.into_output(),
                station2: station2.into_output(),
                station3: station3.into_output(),
                station4: station4.into_output(),
                station5: station5.into_output(),
                station6: station6.into_output(),
                station7: station7.into_output(),
            },
            station_results,
            pipeline_metadata: PipelineMetadata {
                project_name,
                language: *input.language(),
                stages_completed: self.completed_count(),
                total_execution_time_ms: started.elapsed().as_millis() as u64,
                started_at,
                finished_at: Utc::now(),
                artifacts: Vec::new(),
                flags: input.flags().clone(),
            },
        };

        if let Some(store) = &store {
            self.write_artifacts(store, &mut result).await;
        }

        info!(
            stages_completed = result.pipeline_metadata.stages_completed,
            failed = ?result.failed_stations(),
            total_ms = result.pipeline_metadata.total_execution_time_ms,
            artifacts = result.pipeline_metadata.artifacts.len(),
            "Pipeline run finished"
        );
        Ok(result)
    }

    /// Write station reports, the result JSON and the index.
    ///
    /// Failures are logged and leave the file out of the artifact list.
    async fn write_artifacts(&self, store: &ReportStore, result: &mut PipelineRunResult) {
        let (reports, final_report) = {
            let outputs = &result.station_outputs;
            let sections: [&dyn StationReport; 6] = [
                &outputs.station1,
                &outputs.station2,
                &outputs.station3,
                &outputs.station4,
                &outputs.station5,
                &outputs.station6,
            ];
            let reports: Vec<(u8, String, String)> = (1u8..)
                .zip(sections)
                .map(|(station, section)| {
                    let name = result
                        .station_results
                        .get(&station)
                        .map(|summary| summary.name.clone())
                        .unwrap_or_else(|| section.title().to_string());
                    (station, name, section.render_text())
                })
                .collect();
            (reports, outputs.station7.report_path.clone().map(PathBuf::from))
        };

        let mut written = Vec::new();
        for (station, name, body) in reports {
            match store.write_station_report(station, &name, &body).await {
                Ok(path) => written.push(path),
                Err(err) => warn!(station, error = %err, "Station report not written"),
            }
        }
        written.extend(final_report);

        let result_path = store.base_path().join(RESULT_FILE);
        let index_path = store.base_path().join(INDEX_FILE);
        result.pipeline_metadata.artifacts = written
            .iter()
            .chain([&result_path, &index_path])
            .map(|path| path.display().to_string())
            .collect();

        match store.write_json(RESULT_FILE, &*result).await {
            Ok(path) => written.push(path),
            Err(err) => warn!(error = %err, "Pipeline result not written"),
        }
        match store
            .write_index(&result.pipeline_metadata.project_name, &written)
            .await
        {
            Ok(path) => written.push(path),
            Err(err) => warn!(error = %err, "Index not written"),
        }

        result.pipeline_metadata.artifacts = written
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        info!(dir = %store.base_path().display(), files = written.len(), "Artifacts written");
    }
}
