//! Orchestrator pacing and artifact settings.

use dramaturg_rate_limit::PipelineConfig;
use std::path::PathBuf;
use std::time::Duration;

/// How the orchestrator paces a run and where it writes artifacts.
///
/// # Examples
///
/// ```
/// use dramaturg_pipeline::PipelineSettings;
/// use std::time::Duration;
///
/// let settings = PipelineSettings::builder()
///     .inter_stage_delay(Duration::ZERO)
///     .output_dir("reports")
///     .build()
///     .unwrap();
///
/// assert_eq!(*settings.max_text_chars(), 60_000);
/// assert!(settings.output_dir().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, derive_getters::Getters, derive_builder::Builder)]
pub struct PipelineSettings {
    /// Pause after each of stations 1 to 6
    #[builder(default = "Duration::from_secs(5)")]
    inter_stage_delay: Duration,
    /// Source text truncation limit, in characters
    #[builder(default = "60_000")]
    max_text_chars: usize,
    /// Directory receiving reports; `None` disables persistence
    #[builder(default, setter(into, strip_option))]
    output_dir: Option<PathBuf>,
}

impl PipelineSettings {
    /// Creates a new settings builder.
    pub fn builder() -> PipelineSettingsBuilder {
        PipelineSettingsBuilder::default()
    }

    /// Same settings with no pause between stations.
    pub fn without_delay(mut self) -> Self {
        self.inter_stage_delay = Duration::ZERO;
        self
    }

    /// Same settings writing artifacts under `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            inter_stage_delay: Duration::from_secs(5),
            max_text_chars: 60_000,
            output_dir: None,
        }
    }
}

impl From<&PipelineConfig> for PipelineSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            inter_stage_delay: config.inter_stage_delay(),
            max_text_chars: config.max_text_chars,
            output_dir: config
                .persist_artifacts
                .then(|| config.output_dir.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_without_persistence_has_no_output_dir() {
        let config = PipelineConfig {
            persist_artifacts: false,
            ..Default::default()
        };
        let settings = PipelineSettings::from(&config);
        assert!(settings.output_dir().is_none());
        assert_eq!(settings.inter_stage_delay(), &Duration::from_millis(5_000));
    }

    #[test]
    fn without_delay_keeps_other_fields() {
        let settings = PipelineSettings::default()
            .with_output_dir("out")
            .without_delay();
        assert_eq!(settings.inter_stage_delay(), &Duration::ZERO);
        assert_eq!(settings.output_dir().as_deref(), Some(std::path::Path::new("out")));
    }
}
