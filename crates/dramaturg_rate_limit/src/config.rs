//! Layered TOML configuration.
//!
//! Sources, later ones overriding earlier ones:
//! - Bundled defaults (include_str! from dramaturg.toml)
//! - ~/.config/dramaturg/dramaturg.toml
//! - ./dramaturg.toml

use crate::ModelTier;
use config::{Config, File, FileFormat};
use dramaturg_error::{ConfigError, DramaturgError, DramaturgResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../dramaturg.toml");

/// Model selection and per-call limits.
///
/// ```toml
/// [models]
/// primary = "gemini-2.5-flash"
/// fallback = "gemini-2.5-flash-lite"
/// request_timeout_secs = 120
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Default model for every request
    pub primary: String,
    /// Model substituted once when the primary call fails
    pub fallback: Option<String>,
    /// Upper bound on a single backend call
    pub request_timeout_secs: u64,
    /// Maximum output tokens per call
    pub max_tokens: u32,
    /// Default sampling temperature
    pub temperature: f32,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            primary: "gemini-2.5-flash".to_string(),
            fallback: Some("gemini-2.5-flash-lite".to_string()),
            request_timeout_secs: 120,
            max_tokens: 8192,
            temperature: 0.7,
        }
    }
}

impl ModelsConfig {
    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Minimum gap, in milliseconds, for each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TierDelays {
    /// Cheap tier gap
    pub cheap: u64,
    /// Mid tier gap
    pub mid: u64,
    /// Top tier gap
    pub top: u64,
}

impl Default for TierDelays {
    fn default() -> Self {
        Self {
            cheap: 6_000,
            mid: 10_000,
            top: 15_000,
        }
    }
}

impl TierDelays {
    /// Same gap for every tier. Handy for tests.
    pub fn uniform(ms: u64) -> Self {
        Self {
            cheap: ms,
            mid: ms,
            top: ms,
        }
    }

    /// Gap for a tier.
    pub fn for_tier(&self, tier: ModelTier) -> Duration {
        let ms = match tier {
            ModelTier::Cheap => self.cheap,
            ModelTier::Mid => self.mid,
            ModelTier::Top => self.top,
        };
        Duration::from_millis(ms)
    }
}

/// Per-model throttle settings.
///
/// ```toml
/// [throttle]
/// default_tier = "mid"
///
/// [throttle.delays_ms]
/// cheap = 6_000
///
/// [throttle.models]
/// "gemini-2.5-pro" = "top"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Tier for model ids not listed in `models`
    pub default_tier: ModelTier,
    /// Gap per tier
    pub delays_ms: TierDelays,
    /// Model id to tier
    pub models: HashMap<String, ModelTier>,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        let models = [
            ("gemini-2.0-flash-lite", ModelTier::Cheap),
            ("gemini-2.5-flash-lite", ModelTier::Cheap),
            ("gemini-2.0-flash", ModelTier::Mid),
            ("gemini-2.5-flash", ModelTier::Mid),
            ("gemini-2.5-pro", ModelTier::Top),
        ]
        .into_iter()
        .map(|(model, tier)| (model.to_string(), tier))
        .collect();

        Self {
            default_tier: ModelTier::Mid,
            delays_ms: TierDelays::default(),
            models,
        }
    }
}

impl ThrottleConfig {
    /// Tier for a model id, falling back to the default tier.
    pub fn tier_for(&self, model_id: &str) -> ModelTier {
        self.models
            .get(model_id)
            .copied()
            .unwrap_or(self.default_tier)
    }

    /// Minimum gap between calls to a model id.
    pub fn delay_for(&self, model_id: &str) -> Duration {
        self.delays_ms.for_tier(self.tier_for(model_id))
    }
}

/// Pipeline pacing and artifact settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pause after each of stations 1 to 6
    pub inter_stage_delay_ms: u64,
    /// Directory receiving reports
    pub output_dir: PathBuf,
    /// Source text truncation limit, in characters
    pub max_text_chars: usize,
    /// Whether reports are written at all
    pub persist_artifacts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inter_stage_delay_ms: 5_000,
            output_dir: PathBuf::from("analysis_output"),
            max_text_chars: 60_000,
            persist_artifacts: true,
        }
    }
}

impl PipelineConfig {
    /// Inter-stage delay as a duration.
    pub fn inter_stage_delay(&self) -> Duration {
        Duration::from_millis(self.inter_stage_delay_ms)
    }
}

/// Top-level Dramaturg configuration.
///
/// # Example
///
/// ```no_run
/// use dramaturg_rate_limit::DramaturgConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DramaturgConfig::load()?;
/// println!("Primary model: {}", config.models.primary);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DramaturgConfig {
    /// Model selection
    pub models: ModelsConfig,
    /// Per-model throttling
    pub throttle: ThrottleConfig,
    /// Pipeline pacing and artifacts
    pub pipeline: PipelineConfig,
}

impl DramaturgConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DramaturgResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                DramaturgError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                DramaturgError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Bundled defaults only, ignoring user files.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file fails to parse.
    pub fn bundled() -> DramaturgResult<Self> {
        Self::build(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    /// Load configuration with precedence: current dir > home dir > bundled.
    ///
    /// User config files are optional and silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if any present source fails to parse.
    #[instrument]
    pub fn load() -> DramaturgResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/dramaturg/dramaturg.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("dramaturg").required(false));

        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> DramaturgResult<Self> {
        builder
            .build()
            .map_err(|e| {
                DramaturgError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                DramaturgError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_matches_defaults() {
        let config = DramaturgConfig::bundled().unwrap();
        assert_eq!(config.models, ModelsConfig::default());
        assert_eq!(config.throttle, ThrottleConfig::default());
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn unknown_models_use_mid_tier() {
        let throttle = ThrottleConfig::default();
        assert_eq!(throttle.tier_for("some-new-model"), ModelTier::Mid);
        assert_eq!(throttle.delay_for("some-new-model"), Duration::from_secs(10));
        assert_eq!(throttle.delay_for("gemini-2.5-flash-lite"), Duration::from_secs(6));
        assert_eq!(throttle.delay_for("gemini-2.5-pro"), Duration::from_secs(15));
    }
}
