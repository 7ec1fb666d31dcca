//! Station 7: the final plain-text report.

use crate::report::StationReport;
use crate::sanitize::sanitize_plain_text;
use crate::{
    DiagnosticSnapshot, Station, Station1Output, Station2Output, Station3Output, Station4Output,
    Station5Output, Station6Output, StationContext, tasks,
};
use async_trait::async_trait;
use dramaturg_core::{StageStatus, truncate_chars, word_count};
use dramaturg_error::StageError;
use dramaturg_storage::ReportStore;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

/// Budget per station section of the digest.
const DIGEST_SECTION_CHARS: usize = 1_500;

/// Everything the earlier stations produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalReportInput {
    /// Project name
    pub project_name: String,
    /// Station 1 output
    pub station1: Station1Output,
    /// Station 2 output
    pub station2: Station2Output,
    /// Station 3 output
    pub station3: Station3Output,
    /// Station 4 output
    pub station4: Station4Output,
    /// Station 5 output
    pub station5: Station5Output,
    /// Station 6 output
    pub station6: Station6Output,
}

impl FinalReportInput {
    /// Condensed digest of stations 1 to 6.
    pub fn digest(&self) -> String {
        let sections: [&dyn StationReport; 6] = [
            &self.station1,
            &self.station2,
            &self.station3,
            &self.station4,
            &self.station5,
            &self.station6,
        ];
        sections
            .iter()
            .map(|section| {
                format!(
                    "== {} ==\n{}",
                    section.title(),
                    truncate_chars(section.render_text().trim(), DIGEST_SECTION_CHARS)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl DiagnosticSnapshot for FinalReportInput {
    fn diagnostic_snapshot(&self) -> Value {
        json!({
            "project": self.project_name,
            "characters": self.station1.major_characters.len(),
            "network": self.station3.network_summary,
            "health": self.station6.diagnostics.overall_health_score,
        })
    }
}

/// Shape of the final report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatistics {
    /// Words in the report
    pub word_count: usize,
    /// Blank-line separated paragraphs
    pub paragraph_count: usize,
    /// Earlier stations included in the digest
    pub stations_summarized: usize,
}

/// Station 7 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station7Output {
    /// Plain-text report
    pub final_report: String,
    /// Where the report was written, when persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    /// Shape of the report
    pub statistics: ReportStatistics,
}

impl StationReport for Station7Output {
    fn title(&self) -> &'static str {
        "Station 7: Final Report"
    }

    fn render_text(&self) -> String {
        self.final_report.clone()
    }
}

fn paragraph_count(text: &str) -> usize {
    text.split("\n\n").filter(|p| !p.trim().is_empty()).count()
}

/// Station 7: writes the final report.
#[derive(Debug, Clone)]
pub struct FinalReportStation {
    ctx: StationContext,
    store: Option<ReportStore>,
}

impl FinalReportStation {
    /// Station that keeps the report in memory only.
    pub fn new(ctx: StationContext) -> Self {
        Self { ctx, store: None }
    }

    /// Station persisting through an existing store.
    pub fn with_store(ctx: StationContext, store: ReportStore) -> Self {
        Self {
            ctx,
            store: Some(store),
        }
    }
}

#[async_trait]
impl Station for FinalReportStation {
    type Input = FinalReportInput;
    type Output = Station7Output;
    const NUMBER: u8 = 7;

    fn name(&self) -> &'static str {
        "Final Report"
    }

    #[instrument(skip_all, fields(project = %input.project_name))]
    async fn process(&self, input: &FinalReportInput) -> Result<Station7Output, StageError> {
        let request = self
            .ctx
            .prompt(tasks::FINAL_REPORT)
            .instruction(format!(
                "Write the final dramaturgical report for \"{}\" as flowing plain prose. \
                 Cover the characters, the concept, the conflict network, efficiency, dynamics, \
                 diagnostics and the treatment plan. Do not use markdown, headings or bullet lists.",
                input.project_name
            ))
            .section("Analysis digest", input.digest())
            .build();

        let reply = self.ctx.client().generate_text(&request).await?;
        let final_report = sanitize_plain_text(reply.content());
        if final_report.is_empty() {
            return Err(StageError::processing("final report is empty"));
        }

        let report_path = match &self.store {
            Some(store) => match store.write_final_report(&final_report).await {
                Ok(path) => Some(path.display().to_string()),
                Err(err) => {
                    warn!(error = %err, "Final report not persisted");
                    None
                }
            },
            None => None,
        };

        let statistics = ReportStatistics {
            word_count: word_count(&final_report),
            paragraph_count: paragraph_count(&final_report),
            stations_summarized: 6,
        };
        info!(
            words = statistics.word_count,
            paragraphs = statistics.paragraph_count,
            persisted = report_path.is_some(),
            "Final report written"
        );

        Ok(Station7Output {
            final_report,
            report_path,
            statistics,
        })
    }

    fn fallback(&self) -> Station7Output {
        Station7Output {
            final_report: self.ctx.undetermined(),
            report_path: None,
            statistics: ReportStatistics::default(),
        }
    }

    fn assess(&self, output: &Station7Output) -> StageStatus {
        if self.store.is_some() && output.report_path.is_none() {
            StageStatus::Partial
        } else {
            StageStatus::Success
        }
    }
}
