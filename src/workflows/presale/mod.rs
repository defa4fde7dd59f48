//! Pre-sales survey analytics: lead scoring, RFIE segmentation, weekly trend
//! and alerting over one normalized response table.

pub mod alerts;
pub mod domain;
pub mod error;
pub mod lead;
pub mod narrative;
pub mod report;
pub mod rfie;
pub mod stats;
pub mod trend;

pub use alerts::{Alert, AlertKind, AlertSeverity};
pub use domain::{ConsultationGrade, RespondentRecord, HIGH_INTENT_THRESHOLD};
pub use error::AnalysisError;
pub use lead::{LeadAssessment, LeadGrade, LeadScorer, PriceRange, ScoringConfig};
pub use narrative::{
    DisabledNarrativeService, GeminiNarrativeService, InsightPrompt, NarrativeError,
    NarrativeOutcome, NarrativeService,
};
pub use report::{ComponentOutcome, ScoredRecord, SurveyAnalysis, SurveyReport};
pub use rfie::{RfieAnalyzer, RfieAssessment, RfieSegment};
pub use trend::{assign_weeks, weekly_trend, PeriodMetrics, WeekLabel, WeeklyPeriodStats};
