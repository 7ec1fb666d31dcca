//! Sequential orchestration of the seven Dramaturg stations.
//!
//! [`PipelineOrchestrator`] normalises a raw JSON request into a
//! [`PipelineInput`], runs stations 1 through 7 strictly in order with a
//! pause between them, adopts the network enriched by station 5, writes the
//! run's artifacts and returns a [`PipelineRunResult`].
//!
//! # Example
//!
//! ```no_run
//! use dramaturg_models::{ModelClient, ModelSettings, scripted::ScriptedGenerator};
//! use dramaturg_pipeline::{PipelineOrchestrator, PipelineSettings};
//! use dramaturg_rate_limit::NoopThrottle;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ModelClient::new(
//!     Arc::new(ScriptedGenerator::new().with_default("{}")),
//!     Arc::new(NoopThrottle),
//!     ModelSettings::new("offline", None),
//! );
//! let orchestrator = PipelineOrchestrator::new(Arc::new(client), PipelineSettings::default());
//! let result = orchestrator
//!     .run_full_analysis(json!({ "fullText": "INT. HOUSE - NIGHT", "language": "en" }))
//!     .await?;
//! println!("{} stations completed", result.pipeline_metadata.stages_completed);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod input;
mod orchestrator;
mod result;
mod settings;
mod state;

pub use input::PipelineInput;
pub use orchestrator::PipelineOrchestrator;
pub use result::{PipelineMetadata, PipelineRunResult, StageSummary, StationOutputs};
pub use settings::{PipelineSettings, PipelineSettingsBuilder};
pub use state::StationState;
