use super::super::alerts::Alert;
use super::super::domain::RespondentRecord;
use super::super::error::AnalysisError;
use super::super::lead::{GradeSegmentDetail, LeadAssessment, LeadScoreSummary};
use super::super::narrative::NarrativeOutcome;
use super::super::rfie::{RfieAssessment, RfieSummary};
use super::super::trend::{PeriodComparison, WeeklyPeriodStats};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};

pub const FAILURE_PREFIX: &str = "계산 실패";

/// Result slot of one analysis component inside the combined report.
///
/// A failed component serializes as the plain string `"계산 실패: <reason>"`
/// so dashboards render it in place of the missing section.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentOutcome<T> {
    Computed(T),
    Failed { reason: String },
}

impl<T> ComponentOutcome<T> {
    pub fn computed(&self) -> Option<&T> {
        match self {
            Self::Computed(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Computed(_) => None,
            Self::Failed { reason } => Some(format!("{FAILURE_PREFIX}: {reason}")),
        }
    }
}

impl<T> From<Result<T, AnalysisError>> for ComponentOutcome<T> {
    fn from(result: Result<T, AnalysisError>) -> Self {
        match result {
            Ok(value) => Self::Computed(value),
            Err(err) => Self::Failed {
                reason: err.to_string(),
            },
        }
    }
}

impl<T: Serialize> Serialize for ComponentOutcome<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Computed(value) => value.serialize(serializer),
            Self::Failed { reason } => {
                serializer.serialize_str(&format!("{FAILURE_PREFIX}: {reason}"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub total_responses: usize,
    pub mean_intent: Option<f64>,
    pub high_intent_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_awareness: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_unit_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProspectBasis {
    ConsultationGrade,
    HighIntent,
}

impl ProspectBasis {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ConsultationGrade => "상담 등급 S/A",
            Self::HighIntent => "의향 6점 이상",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total_responses: usize,
    pub prospects: usize,
    pub prospect_basis: ProspectBasis,
    pub prospect_basis_label: &'static str,
    pub conversion_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManagerPerformance {
    pub manager: String,
    pub responses: usize,
    pub mean_intent: Option<f64>,
    pub high_intent_count: usize,
    pub high_intent_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeCount {
    pub name: String,
    pub responses: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyIntake {
    pub date: NaiveDate,
    pub responses: usize,
    pub cumulative: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadScoringView {
    pub summary: LeadScoreSummary,
    pub segment_details: Vec<GradeSegmentDetail>,
}

/// Warnings against the comparison period plus dataset-level advisories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertDigest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<PeriodComparison>,
    pub warnings: Vec<Alert>,
    pub advisories: Vec<Alert>,
}

impl AlertDigest {
    /// Warnings first, then advisories, each in rule order.
    pub fn messages(&self) -> Vec<String> {
        self.warnings
            .iter()
            .chain(&self.advisories)
            .map(|alert| alert.message.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedAnalytics {
    pub lead_scoring: ComponentOutcome<LeadScoringView>,
    pub rfie: ComponentOutcome<RfieSummary>,
    pub alerts: ComponentOutcome<AlertDigest>,
}

/// Source row with the derived columns appended. A column stays empty when
/// its component failed for the whole table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: RespondentRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead: Option<LeadAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rfie: Option<RfieAssessment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyReport {
    pub overview: DatasetOverview,
    pub key_metrics: KeyMetrics,
    pub weekly_trend: Vec<WeeklyPeriodStats>,
    pub advanced: AdvancedAnalytics,
    pub managers: Vec<ManagerPerformance>,
    pub spots: Vec<IntakeCount>,
    pub regions: Vec<IntakeCount>,
    pub daily_intake: Vec<DailyIntake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<NarrativeOutcome>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<ScoredRecord>,
}
