//! Station 6: structural diagnostics, health score and treatment plan.

use crate::reply::{array, int_field, list_field, or_undetermined, str_field};
use crate::report::StationReport;
use crate::{DiagnosticSnapshot, Station, Station4Output, Station5Output, StationContext, tasks};
use async_trait::async_trait;
use dramaturg_core::{Language, StageStatus};
use dramaturg_error::StageError;
use dramaturg_models::Payload;
use dramaturg_network::{ConflictNetwork, ConflictPhase};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::str::FromStr;
use tracing::{info, instrument, warn};

/// Relationships at or below this strength are weak.
const WEAK_STRENGTH: u8 = 3;
/// Efficiency scores below this raise a warning.
const LOW_EFFICIENCY: f64 = 4.0;

/// The network plus the metrics and dynamics that describe it.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsInput {
    /// Latest network
    pub network: ConflictNetwork,
    /// Station 4 output
    pub station4: Station4Output,
    /// Station 5 output
    pub station5: Station5Output,
}

impl DiagnosticSnapshot for DiagnosticsInput {
    fn diagnostic_snapshot(&self) -> Value {
        json!({
            "network": self.network.summary(),
            "efficiency": self.station4.efficiency_metrics.overall_efficiency_score,
        })
    }
}

/// How serious an issue is.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum IssueCategory {
    /// Breaks the drama
    Critical,
    /// Weakens the drama
    Warning,
    /// Could be better
    #[default]
    Suggestion,
}

impl IssueCategory {
    /// Default severity for issues of this category.
    pub fn default_severity(&self) -> u8 {
        match self {
            IssueCategory::Critical => 9,
            IssueCategory::Warning => 6,
            IssueCategory::Suggestion => 3,
        }
    }
}

/// One diagnosed problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Seriousness class
    pub category: IssueCategory,
    /// What is wrong
    pub description: String,
    /// 1 to 10
    pub severity: u8,
    /// How to fix it
    pub suggested_fix: String,
    /// Character or conflict names affected
    pub affected: Vec<String>,
}

/// Issues by category and the resulting health score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// 0 to 100
    pub overall_health_score: u8,
    /// Critical issues
    pub critical_issues: Vec<Issue>,
    /// Warnings
    pub warnings: Vec<Issue>,
    /// Suggestions
    pub suggestions: Vec<Issue>,
    /// Names of characters with no relationship and no conflict
    pub isolated_characters: Vec<String>,
    /// Total issue count
    pub total_issues: usize,
}

impl Diagnostics {
    /// Sort issues into categories and score them.
    ///
    /// # Examples
    ///
    /// ```
    /// use dramaturg_stations::Diagnostics;
    ///
    /// let clean = Diagnostics::from_issues(Vec::new(), Vec::new());
    /// assert_eq!(clean.overall_health_score, 100);
    /// ```
    pub fn from_issues(issues: Vec<Issue>, isolated_characters: Vec<String>) -> Self {
        let mut diagnostics = Self {
            isolated_characters,
            total_issues: issues.len(),
            ..Default::default()
        };
        for issue in issues {
            match issue.category {
                IssueCategory::Critical => diagnostics.critical_issues.push(issue),
                IssueCategory::Warning => diagnostics.warnings.push(issue),
                IssueCategory::Suggestion => diagnostics.suggestions.push(issue),
            }
        }
        diagnostics.overall_health_score = health_score(
            diagnostics.critical_issues.len(),
            diagnostics.warnings.len(),
            diagnostics.suggestions.len(),
        );
        diagnostics
    }
}

/// `100 - 25 * critical - 10 * warnings - 3 * suggestions`, clamped to 0..=100.
pub(crate) fn health_score(critical: usize, warnings: usize, suggestions: usize) -> u8 {
    let penalty = 25 * critical as i64 + 10 * warnings as i64 + 3 * suggestions as i64;
    (100 - penalty).clamp(0, 100) as u8
}

/// One step of the treatment plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    /// 1 is most urgent
    pub priority: u8,
    /// Issue addressed
    pub issue: String,
    /// What to do
    pub action: String,
    /// Expected effect
    pub expected_impact: String,
}

/// Ordered treatments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPlan {
    /// Treatments, most urgent first
    pub treatments: Vec<Treatment>,
    /// Overview
    pub summary: String,
}

/// Station 6 output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station6Output {
    /// Issues and health score
    pub diagnostics: Diagnostics,
    /// What to do about them
    pub treatment_plan: TreatmentPlan,
}

impl StationReport for Station6Output {
    fn title(&self) -> &'static str {
        "Station 6: Diagnostics and Treatment"
    }

    fn render_text(&self) -> String {
        let d = &self.diagnostics;
        let mut text = format!(
            "Health score: {}/100\nIssues: {} ({} critical, {} warnings, {} suggestions)\n",
            d.overall_health_score,
            d.total_issues,
            d.critical_issues.len(),
            d.warnings.len(),
            d.suggestions.len()
        );
        for issue in d.critical_issues.iter().chain(&d.warnings).chain(&d.suggestions) {
            text.push_str(&format!(
                "  [{}/{}] {} Fix: {}\n",
                issue.category, issue.severity, issue.description, issue.suggested_fix
            ));
        }
        text.push_str("\nTreatment plan:\n");
        for treatment in &self.treatment_plan.treatments {
            text.push_str(&format!(
                "  {}. {}: {} ({})\n",
                treatment.priority, treatment.issue, treatment.action, treatment.expected_impact
            ));
        }
        text.push_str(&format!("{}\n", self.treatment_plan.summary));
        text
    }
}

/// Local checks that need no model.
pub(crate) fn structural_issues(
    network: &ConflictNetwork,
    efficiency_score: Option<f64>,
    language: Language,
) -> (Vec<Issue>, Vec<String>) {
    let ar = language == Language::Ar;
    let mut issues = Vec::new();

    if network.conflicts().is_empty() {
        issues.push(Issue {
            category: IssueCategory::Critical,
            description: if ar { "لا توجد صراعات في الشبكة الدرامية" } else { "The network contains no conflicts" }.into(),
            severity: 9,
            suggested_fix: if ar { "أضف صراعاً مركزياً يربط الشخصيات الرئيسية" } else { "Introduce a central conflict binding the major characters" }.into(),
            affected: Vec::new(),
        });
    }

    let isolated: Vec<String> = network
        .characters()
        .values()
        .filter(|c| network.involvement(c.id()) == 0)
        .map(|c| c.name().clone())
        .collect();
    for name in &isolated {
        issues.push(Issue {
            category: IssueCategory::Warning,
            description: if ar {
                format!("الشخصية {} معزولة بلا علاقات أو صراعات", name)
            } else {
                format!("{} has no relationships and no conflicts", name)
            },
            severity: 6,
            suggested_fix: if ar { "اربط الشخصية بصراع قائم أو احذفها" } else { "Tie the character into an existing conflict or cut it" }.into(),
            affected: vec![name.clone()],
        });
    }

    let latent: Vec<String> = network
        .conflicts()
        .values()
        .filter(|c| *c.phase() == ConflictPhase::Latent)
        .map(|c| c.name().clone())
        .collect();
    if !latent.is_empty() {
        issues.push(Issue {
            category: IssueCategory::Suggestion,
            description: if ar { "صراعات لم تتجاوز مرحلة الكمون" } else { "Some conflicts never leave the latent phase" }.into(),
            severity: 3,
            suggested_fix: if ar { "امنح هذه الصراعات لحظة ظهور وتصعيد" } else { "Give these conflicts a moment of emergence and escalation" }.into(),
            affected: latent,
        });
    }

    let relationships = network.relationships();
    if !relationships.is_empty() && relationships.values().all(|r| *r.strength() <= WEAK_STRENGTH) {
        issues.push(Issue {
            category: IssueCategory::Suggestion,
            description: if ar { "جميع العلاقات ضعيفة الشدة" } else { "Every relationship is weak" }.into(),
            severity: 3,
            suggested_fix: if ar { "عمّق علاقة محورية واحدة على الأقل" } else { "Deepen at least one pivotal relationship" }.into(),
            affected: Vec::new(),
        });
    }

    if let Some(score) = efficiency_score
        && !network.is_empty()
        && score < LOW_EFFICIENCY
    {
        issues.push(Issue {
            category: IssueCategory::Warning,
            description: if ar {
                format!("الكفاءة الدرامية منخفضة ({:.1}/10)", score)
            } else {
                format!("Dramatic efficiency is low ({:.1}/10)", score)
            },
            severity: 6,
            suggested_fix: if ar { "ادمج الشخصيات والعلاقات المتكررة" } else { "Merge redundant characters and relationships" }.into(),
            affected: Vec::new(),
        });
    }

    (issues, isolated)
}

fn issue_from_value(item: &Value, language: Language) -> Option<Issue> {
    let description = str_field(item, &["description", "issue", "problem"])?;
    let category = str_field(item, &["category", "type", "level"])
        .and_then(|label| IssueCategory::from_str(label.trim()).ok())
        .unwrap_or_default();
    let severity = int_field(item, &["severity"])
        .map(|s| s.clamp(1, 10) as u8)
        .unwrap_or_else(|| category.default_severity());
    Some(Issue {
        category,
        description,
        severity,
        suggested_fix: or_undetermined(str_field(item, &["suggested_fix", "suggestedFix", "fix"]), language),
        affected: list_field(item, &["affected", "affected_characters", "characters"]),
    })
}

fn treatments_from_issues(issues: &[Issue]) -> Vec<Treatment> {
    let mut ordered: Vec<&Issue> = issues.iter().collect();
    ordered.sort_by(|a, b| a.category.cmp(&b.category).then(b.severity.cmp(&a.severity)));
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, issue)| Treatment {
            priority: (i + 1).min(u8::MAX as usize) as u8,
            issue: issue.description.clone(),
            action: issue.suggested_fix.clone(),
            expected_impact: issue.category.to_string(),
        })
        .collect()
}

/// Station 6: finds what is wrong and how to fix it.
#[derive(Debug, Clone)]
pub struct DiagnosticsStation {
    ctx: StationContext,
}

impl DiagnosticsStation {
    /// Station over a shared context.
    pub fn new(ctx: StationContext) -> Self {
        Self { ctx }
    }

    async fn model_issues(&self, input: &DiagnosticsInput, known: &[Issue]) -> Vec<Issue> {
        let known_text = known
            .iter()
            .map(|i| format!("- [{}] {}", i.category, i.description))
            .collect::<Vec<_>>()
            .join("\n");
        let request = self
            .ctx
            .prompt(tasks::DIAGNOSE_ISSUES)
            .instruction(
                "Diagnose dramatic weaknesses the structural checks below did not already report.",
            )
            .json(r#"{"issues": [{"category": "critical|warning|suggestion", "description": "text", "severity": 1-10, "suggested_fix": "text", "affected": ["name"]}]}"#)
            .section("Network", json!(input.network.summary()).to_string())
            .section("Efficiency", json!(input.station4.efficiency_metrics).to_string())
            .section(
                "Evolution",
                json!(input.station5.dynamic_analysis.network_evolution).to_string(),
            )
            .section("Already found", known_text)
            .build();

        match self.ctx.client().generate_json::<Value>(&request).await {
            Ok(response) => response
                .into_content()
                .structured()
                .and_then(|value| array(value, &["issues"]))
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| issue_from_value(item, self.ctx.language()))
                        .collect()
                })
                .unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "Issue diagnosis failed");
                Vec::new()
            }
        }
    }

    async fn treatment_plan(&self, diagnostics: &Diagnostics) -> TreatmentPlan {
        let all: Vec<Issue> = diagnostics
            .critical_issues
            .iter()
            .chain(&diagnostics.warnings)
            .chain(&diagnostics.suggestions)
            .cloned()
            .collect();
        let request = self
            .ctx
            .prompt(tasks::TREATMENT_PLAN)
            .instruction("Write a prioritized treatment plan for these issues (priority 1 is most urgent).")
            .json(r#"{"treatments": [{"priority": 1, "issue": "text", "action": "text", "expected_impact": "text"}], "summary": "text"}"#)
            .section("Issues", json!(all).to_string())
            .build();

        let language = self.ctx.language();
        let reply = match self.ctx.client().generate_json::<Value>(&request).await {
            Ok(response) => response.into_content(),
            Err(err) => {
                warn!(error = %err, "Treatment plan failed");
                Payload::Unstructured(String::new())
            }
        };

        match reply {
            Payload::Structured(value) => {
                let mut treatments: Vec<Treatment> = array(&value, &["treatments", "plan"])
                    .into_iter()
                    .flatten()
                    .enumerate()
                    .filter_map(|(i, item)| {
                        Some(Treatment {
                            priority: int_field(item, &["priority"])
                                .map(|p| p.clamp(1, u8::MAX as i64) as u8)
                                .unwrap_or((i + 1).min(u8::MAX as usize) as u8),
                            issue: str_field(item, &["issue", "problem"])?,
                            action: or_undetermined(str_field(item, &["action", "treatment"]), language),
                            expected_impact: or_undetermined(
                                str_field(item, &["expected_impact", "expectedImpact", "impact"]),
                                language,
                            ),
                        })
                    })
                    .collect();
                if treatments.is_empty() {
                    treatments = treatments_from_issues(&all);
                }
                treatments.sort_by_key(|t| t.priority);
                TreatmentPlan {
                    treatments,
                    summary: or_undetermined(str_field(&value, &["summary"]), language),
                }
            }
            Payload::Unstructured(raw) => TreatmentPlan {
                treatments: treatments_from_issues(&all),
                summary: or_undetermined(Some(raw.trim().to_string()), language),
            },
        }
    }
}

#[async_trait]
impl Station for DiagnosticsStation {
    type Input = DiagnosticsInput;
    type Output = Station6Output;
    const NUMBER: u8 = 6;

    fn name(&self) -> &'static str {
        "Diagnostics and Treatment"
    }

    #[instrument(skip_all)]
    async fn process(&self, input: &DiagnosticsInput) -> Result<Station6Output, StageError> {
        let (mut issues, isolated) = structural_issues(
            &input.network,
            Some(input.station4.efficiency_metrics.overall_efficiency_score),
            self.ctx.language(),
        );
        let proposed = self.model_issues(input, &issues).await;
        issues.extend(proposed);

        let diagnostics = Diagnostics::from_issues(issues, isolated);
        info!(
            health = diagnostics.overall_health_score,
            critical = diagnostics.critical_issues.len(),
            warnings = diagnostics.warnings.len(),
            suggestions = diagnostics.suggestions.len(),
            "Diagnostics complete"
        );

        let treatment_plan = self.treatment_plan(&diagnostics).await;
        Ok(Station6Output {
            diagnostics,
            treatment_plan,
        })
    }

    fn fallback(&self) -> Station6Output {
        Station6Output::default()
    }

    fn assess(&self, output: &Station6Output) -> StageStatus {
        if crate::reply::is_placeholder(&output.treatment_plan.summary, self.ctx.language()) {
            StageStatus::Partial
        } else {
            StageStatus::Success
        }
    }
}
