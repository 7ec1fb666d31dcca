//! The station contract and its failure-containing runner.

use async_trait::async_trait;
use dramaturg_core::{StageMetadata, StageResult, StageStatus};
use dramaturg_error::{StageError, StageErrorKind};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Compact description of a station input for failure logs.
///
/// Implementations report lengths and counts, never the full text.
pub trait DiagnosticSnapshot {
    /// Lengths and counts describing the input.
    fn diagnostic_snapshot(&self) -> Value;
}

/// One analysis step of the pipeline.
///
/// `process` may fail freely; the [`StationRunner`] turns any error into the
/// station's [`fallback`](Station::fallback) output with status `Failed`.
#[async_trait]
pub trait Station: Send + Sync {
    /// What the station reads.
    type Input: DiagnosticSnapshot + Send + Sync;
    /// What the station produces.
    type Output: Clone + Serialize + Send;

    /// Position in the pipeline, 1 to 7.
    const NUMBER: u8;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Run the station.
    async fn process(&self, input: &Self::Input) -> Result<Self::Output, StageError>;

    /// Output used when `process` fails.
    fn fallback(&self) -> Self::Output;

    /// Classify a successful output. Stations whose sections can degrade to
    /// placeholders report `Partial` here.
    fn assess(&self, _output: &Self::Output) -> StageStatus {
        StageStatus::Success
    }
}

/// Check applied to a station input or output; `Err` carries the reason.
pub type Validator<T> = Box<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// Executes a station, containing every failure.
pub struct StationRunner<S: Station> {
    station: S,
    input_validator: Option<Validator<S::Input>>,
    output_validator: Option<Validator<S::Output>>,
}

impl<S: Station> std::fmt::Debug for StationRunner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StationRunner")
            .field("station", &S::NUMBER)
            .field("name", &self.station.name())
            .field("input_validator", &self.input_validator.is_some())
            .field("output_validator", &self.output_validator.is_some())
            .finish()
    }
}

impl<S: Station> StationRunner<S> {
    /// Runner without validators.
    pub fn new(station: S) -> Self {
        Self {
            station,
            input_validator: None,
            output_validator: None,
        }
    }

    /// Reject inputs before the station runs.
    pub fn with_input_validator(
        mut self,
        validator: impl Fn(&S::Input) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.input_validator = Some(Box::new(validator));
        self
    }

    /// Reject outputs after the station runs.
    pub fn with_output_validator(
        mut self,
        validator: impl Fn(&S::Output) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.output_validator = Some(Box::new(validator));
        self
    }

    /// The wrapped station.
    pub fn station(&self) -> &S {
        &self.station
    }

    /// Run the station. Never fails: errors yield the fallback output with
    /// status `Failed` and the error message in the metadata.
    #[instrument(skip_all, fields(station = S::NUMBER, name = self.station.name()))]
    pub async fn execute(&self, input: &S::Input) -> StageResult<S::Output> {
        let started = Instant::now();
        let outcome = self.run(input).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => {
                let status = self.station.assess(&output);
                if status == StageStatus::Partial {
                    warn!(elapsed_ms, "Station completed with placeholders");
                } else {
                    info!(elapsed_ms, "Station completed");
                }
                StageResult::new(
                    output,
                    elapsed_ms,
                    StageMetadata::new(S::NUMBER, self.station.name(), status, None),
                )
            }
            Err(err) => {
                error!(
                    error = %err.kind,
                    input = %input.diagnostic_snapshot(),
                    elapsed_ms,
                    "Station failed; using fallback output"
                );
                StageResult::new(
                    self.station.fallback(),
                    elapsed_ms,
                    StageMetadata::new(
                        S::NUMBER,
                        self.station.name(),
                        StageStatus::Failed,
                        Some(err.kind.to_string()),
                    ),
                )
            }
        }
    }

    async fn run(&self, input: &S::Input) -> Result<S::Output, StageError> {
        if let Some(validate) = &self.input_validator {
            validate(input).map_err(|reason| StageError::new(StageErrorKind::InvalidInput(reason)))?;
        }

        let output = self.station.process(input).await?;

        if let Some(validate) = &self.output_validator {
            validate(&output)
                .map_err(|reason| StageError::new(StageErrorKind::InvalidOutput(reason)))?;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    struct Words(String);

    impl DiagnosticSnapshot for Words {
        fn diagnostic_snapshot(&self) -> Value {
            json!({ "chars": self.0.chars().count() })
        }
    }

    #[async_trait]
    impl Station for Echo {
        type Input = Words;
        type Output = String;
        const NUMBER: u8 = 9;

        fn name(&self) -> &'static str {
            "Echo"
        }

        async fn process(&self, input: &Words) -> Result<String, StageError> {
            if input.0 == "boom" {
                return Err(StageError::processing("exploded"));
            }
            Ok(input.0.to_uppercase())
        }

        fn fallback(&self) -> String {
            "fallback".to_string()
        }

        fn assess(&self, output: &String) -> StageStatus {
            if output.is_empty() {
                StageStatus::Partial
            } else {
                StageStatus::Success
            }
        }
    }

    #[tokio::test]
    async fn success_carries_output_and_status() {
        let result = StationRunner::new(Echo).execute(&Words("hi".into())).await;
        assert_eq!(result.output(), "HI");
        assert_eq!(result.status(), StageStatus::Success);
        assert_eq!(*result.metadata().station(), 9);
        assert!(result.metadata().error().is_none());
    }

    #[tokio::test]
    async fn failure_returns_fallback() {
        let result = StationRunner::new(Echo).execute(&Words("boom".into())).await;
        assert_eq!(result.output(), "fallback");
        assert_eq!(result.status(), StageStatus::Failed);
        assert!(
            result
                .metadata()
                .error()
                .as_deref()
                .is_some_and(|e| e.contains("exploded"))
        );
    }

    #[tokio::test]
    async fn assess_marks_partial() {
        let result = StationRunner::new(Echo).execute(&Words(String::new())).await;
        assert_eq!(result.status(), StageStatus::Partial);
    }

    #[tokio::test]
    async fn input_validator_short_circuits() {
        let runner = StationRunner::new(Echo).with_input_validator(|w: &Words| {
            if w.0.len() < 3 {
                Err("too short".to_string())
            } else {
                Ok(())
            }
        });
        let result = runner.execute(&Words("hi".into())).await;
        assert_eq!(result.status(), StageStatus::Failed);
        assert_eq!(
            result.metadata().error().as_deref(),
            Some("Invalid input: too short")
        );
    }

    #[tokio::test]
    async fn output_validator_rejects() {
        let runner = StationRunner::new(Echo)
            .with_output_validator(|out: &String| Err(format!("rejected {}", out)));
        let result = runner.execute(&Words("hey".into())).await;
        assert_eq!(result.output(), "fallback");
        assert_eq!(
            result.metadata().error().as_deref(),
            Some("Invalid output: rejected HEY")
        );
    }
}
