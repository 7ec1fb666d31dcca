//! Per-model throttling and configuration for Dramaturg.
//!
//! This crate provides:
//! - [`Throttle`]: the seam the model client awaits before every backend call
//! - [`ModelThrottle`]: one GCRA limiter per model id, spaced by cost tier
//! - [`NoopThrottle`]: an immediate throttle for tests and offline runs
//! - [`DramaturgConfig`]: layered TOML configuration (bundled, home, current dir)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod throttle;
mod tier;

pub use config::{DramaturgConfig, ModelsConfig, PipelineConfig, ThrottleConfig, TierDelays};
pub use throttle::{ModelThrottle, NoopThrottle, Throttle};
pub use tier::ModelTier;
