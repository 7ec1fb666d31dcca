//! Dramaturg: dramaturgical analysis of screenplays.
//!
//! A screenplay passes through seven stations, each driving a generative
//! model through a throttled client with one fallback retry:
//!
//! 1. Text analysis: characters, relationships, narrative style
//! 2. Concept: story statements, genres, elevator pitch, tone
//! 3. Conflict network: typed characters, relationships and conflicts
//! 4. Efficiency: graph metrics and recommendations
//! 5. Dynamics: conflict phases, timeline, symbolism, style
//! 6. Diagnostics: issues, health score, treatment plan
//! 7. Final report: a plain-text synthesis
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dramaturg::{DramaturgConfig, PipelineOrchestrator, PipelineSettings, gemini_client};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DramaturgConfig::load()?;
//!     let orchestrator = PipelineOrchestrator::new(
//!         gemini_client(&config)?,
//!         PipelineSettings::from(&config.pipeline),
//!     );
//!     let result = orchestrator
//!         .run_full_analysis(json!({ "fullText": "INT. HOUSE - NIGHT ...", "language": "en" }))
//!         .await?;
//!     println!("{}", result.station_outputs.station7.final_report);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `dramaturg_error` - Error types
//! - `dramaturg_core` - Language, stage results, completion requests, tracing setup
//! - `dramaturg_interface` - The `TextGenerator` backend trait
//! - `dramaturg_rate_limit` - Per-model throttling and layered configuration
//! - `dramaturg_models` - Gemini backend, model client, JSON recovery
//! - `dramaturg_network` - The conflict network
//! - `dramaturg_storage` - Report artifacts
//! - `dramaturg_stations` - The seven stations
//! - `dramaturg_pipeline` - Orchestration
//!
//! This crate (`dramaturg`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use dramaturg_core::*;
pub use dramaturg_error::*;
pub use dramaturg_interface::*;
pub use dramaturg_models::*;
pub use dramaturg_network::*;
pub use dramaturg_pipeline::*;
pub use dramaturg_rate_limit::*;
pub use dramaturg_stations::*;
pub use dramaturg_storage::*;

use std::sync::Arc;

/// Model client over Gemini, throttled and configured from `config`.
///
/// Reads `GEMINI_API_KEY` from the environment.
///
/// # Errors
///
/// Returns error if the API key is missing.
pub fn gemini_client(config: &DramaturgConfig) -> DramaturgResult<Arc<ModelClient>> {
    let generator = GeminiGenerator::new()?;
    Ok(Arc::new(ModelClient::new(
        Arc::new(generator),
        Arc::new(ModelThrottle::new(config.throttle.clone())),
        ModelSettings::from(&config.models),
    )))
}
