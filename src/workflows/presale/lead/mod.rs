mod config;
mod grade;
mod rules;
mod summary;

pub use config::{PriceRange, ScoringConfig, DEFAULT_PRICE_HIGH, DEFAULT_PRICE_LOW};
pub use grade::LeadGrade;
pub use summary::{segment_details, summarize, GradeSegmentDetail, GradeShare, LeadScoreSummary};

use super::domain::RespondentRecord;
use super::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Upper bound of a lead score. The five factor maxima add up to 105 and the
/// grade bands are applied to that uncapped sum.
pub const MAX_LEAD_SCORE: u8 = 105;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadFactor {
    Intent,
    Eligibility,
    Purpose,
    PriceFit,
    Channel,
}

impl LeadFactor {
    pub const fn max_points(self) -> u8 {
        match self {
            Self::Intent => 30,
            Self::Eligibility => 25,
            Self::Purpose => 15,
            Self::PriceFit => 20,
            Self::Channel => 15,
        }
    }
}

/// Discrete contribution to a lead score, kept for auditability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: LeadFactor,
    pub points: u8,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadAssessment {
    pub score: u8,
    pub grade: LeadGrade,
    pub components: Vec<ScoreComponent>,
}

/// Stateless scorer applying one price range to every row.
#[derive(Debug, Clone)]
pub struct LeadScorer {
    config: ScoringConfig,
}

impl LeadScorer {
    pub fn new(config: ScoringConfig) -> Result<Self, AnalysisError> {
        config.price_range.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, record: &RespondentRecord) -> LeadAssessment {
        let (components, score) = rules::score_record(record, &self.config);

        LeadAssessment {
            score,
            grade: LeadGrade::from_score(score),
            components,
        }
    }

    /// Scores every row independently, preserving input order.
    pub fn score_all(&self, records: &[RespondentRecord]) -> Vec<LeadAssessment> {
        records.iter().map(|record| self.score(record)).collect()
    }
}
