//! Recency / Frequency / Intent / Eligibility segmentation.
//!
//! Recency is measured against the latest response date of the analyzed table,
//! never against wall-clock time, so slicing the table shifts the scores.

use super::domain::{latest_response_date, RespondentRecord};
use super::error::AnalysisError;
use super::stats::round_to;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Frequency placeholder until multi-touch history is available.
pub const FREQUENCY_SCORE: u8 = 3;
const NEUTRAL_RECENCY: u8 = 3;
const NEUTRAL_INTENT: u8 = 3;
const ELIGIBILITY_SCORE: u8 = 2;

const RECENCY_BANDS: [(i64, u8); 4] = [(3, 5), (7, 4), (14, 3), (21, 2)];
const INTENT_BANDS: [(f64, u8); 4] = [(7.0, 5), (5.0, 4), (3.0, 3), (2.0, 2)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RfieSegment {
    Champion,
    Loyal,
    Promising,
    AtRisk,
    Lost,
}

const SEGMENT_BANDS: [(u8, RfieSegment); 4] = [
    (15, RfieSegment::Champion),
    (12, RfieSegment::Loyal),
    (8, RfieSegment::Promising),
    (5, RfieSegment::AtRisk),
];

impl RfieSegment {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Champion,
            Self::Loyal,
            Self::Promising,
            Self::AtRisk,
            Self::Lost,
        ]
    }

    pub fn from_total(total: u8) -> Self {
        SEGMENT_BANDS
            .iter()
            .find(|(lower_bound, _)| total >= *lower_bound)
            .map(|(_, segment)| *segment)
            .unwrap_or(Self::Lost)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Champion => "Champion",
            Self::Loyal => "Loyal",
            Self::Promising => "Promising",
            Self::AtRisk => "At Risk",
            Self::Lost => "Lost",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfieAssessment {
    pub recency: u8,
    pub frequency: u8,
    pub intent: u8,
    pub eligibility: u8,
    pub total: u8,
    pub segment: RfieSegment,
}

/// Analyzer bound to one table's reference date.
#[derive(Debug, Clone, Copy)]
pub struct RfieAnalyzer {
    reference: Option<NaiveDateTime>,
}

impl RfieAnalyzer {
    pub fn with_reference(reference: Option<NaiveDateTime>) -> Self {
        Self { reference }
    }

    /// Derives the reference date from the latest valid response date. Rows
    /// without any date value fall back to neutral recency.
    pub fn for_records(records: &[RespondentRecord]) -> Result<Self, AnalysisError> {
        Ok(Self {
            reference: latest_response_date(records)?,
        })
    }

    pub fn reference(&self) -> Option<NaiveDateTime> {
        self.reference
    }

    pub fn assess(&self, record: &RespondentRecord) -> RfieAssessment {
        let recency = self.recency_score(record.response_date);
        let intent = intent_score(record.intent);
        let eligibility = if record.is_subscription_eligible() {
            ELIGIBILITY_SCORE
        } else {
            0
        };
        let total = recency + FREQUENCY_SCORE + intent + eligibility;

        RfieAssessment {
            recency,
            frequency: FREQUENCY_SCORE,
            intent,
            eligibility,
            total,
            segment: RfieSegment::from_total(total),
        }
    }

    pub fn assess_all(&self, records: &[RespondentRecord]) -> Vec<RfieAssessment> {
        records.iter().map(|record| self.assess(record)).collect()
    }

    fn recency_score(&self, response_date: Option<NaiveDateTime>) -> u8 {
        let (Some(reference), Some(date)) = (self.reference, response_date) else {
            return NEUTRAL_RECENCY;
        };

        let days = (reference - date).num_days();
        RECENCY_BANDS
            .iter()
            .find(|(max_days, _)| days <= *max_days)
            .map(|(_, score)| *score)
            .unwrap_or(1)
    }
}

fn intent_score(intent: Option<f64>) -> u8 {
    let Some(intent) = intent else {
        return NEUTRAL_INTENT;
    };

    INTENT_BANDS
        .iter()
        .find(|(lower_bound, _)| intent >= *lower_bound)
        .map(|(_, score)| *score)
        .unwrap_or(1)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentCount {
    pub segment: RfieSegment,
    pub segment_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfieSummary {
    pub total: usize,
    pub mean_score: Option<f64>,
    pub segments: Vec<SegmentCount>,
}

impl RfieSummary {
    pub fn count_for(&self, segment: RfieSegment) -> usize {
        self.segments
            .iter()
            .find(|entry| entry.segment == segment)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}

pub fn summarize(assessments: &[RfieAssessment]) -> RfieSummary {
    let total = assessments.len();
    let mean_score = if total == 0 {
        None
    } else {
        let sum: u32 = assessments
            .iter()
            .map(|assessment| u32::from(assessment.total))
            .sum();
        Some(round_to(f64::from(sum) / total as f64, 1))
    };

    let segments = RfieSegment::ordered()
        .into_iter()
        .map(|segment| SegmentCount {
            segment,
            segment_label: segment.label(),
            count: assessments
                .iter()
                .filter(|assessment| assessment.segment == segment)
                .count(),
        })
        .collect();

    RfieSummary {
        total,
        mean_score,
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .expect("valid date")
            .and_hms_opt(10, 0, 0)
            .expect("valid time")
    }

    fn dated(date: NaiveDateTime) -> RespondentRecord {
        RespondentRecord {
            response_date: Some(date),
            ..Default::default()
        }
    }

    #[test]
    fn recency_bands_use_table_maximum() {
        let latest = at(2024, 3, 31);
        let analyzer = RfieAnalyzer::with_reference(Some(latest));
        let cases = [
            (0, 5),
            (3, 5),
            (4, 4),
            (7, 4),
            (8, 3),
            (14, 3),
            (15, 2),
            (21, 2),
            (22, 1),
        ];

        for (days_ago, expected) in cases {
            let record = dated(latest - Duration::days(days_ago));
            assert_eq!(
                analyzer.assess(&record).recency,
                expected,
                "{days_ago} day(s) before the reference"
            );
        }
    }

    #[test]
    fn reference_is_latest_record_not_today() {
        let records = vec![dated(at(2020, 1, 1)), dated(at(2020, 1, 20))];
        let analyzer = RfieAnalyzer::for_records(&records).expect("dates parse");

        assert_eq!(analyzer.reference(), Some(at(2020, 1, 20)));
        assert_eq!(analyzer.assess(&records[1]).recency, 5);
        assert_eq!(analyzer.assess(&records[0]).recency, 2);
    }

    #[test]
    fn missing_fields_resolve_to_neutral_defaults() {
        let analyzer = RfieAnalyzer::for_records(&[RespondentRecord::default()])
            .expect("no date column is fine");
        let assessment = analyzer.assess(&RespondentRecord::default());

        assert_eq!(assessment.recency, 3);
        assert_eq!(assessment.frequency, 3);
        assert_eq!(assessment.intent, 3);
        assert_eq!(assessment.eligibility, 0);
        assert_eq!(assessment.total, 9);
        assert_eq!(assessment.segment, RfieSegment::Promising);
    }

    #[test]
    fn unparseable_date_column_fails_the_component() {
        let records = vec![
            RespondentRecord {
                unparsed_date: Some("soon".to_string()),
                ..Default::default()
            },
            RespondentRecord::default(),
        ];

        let error = RfieAnalyzer::for_records(&records).expect_err("no date parses");
        assert_eq!(error, AnalysisError::UnparseableDates { rows: 1 });
    }

    #[test]
    fn intent_maps_to_five_point_scale() {
        assert_eq!(intent_score(Some(7.0)), 5);
        assert_eq!(intent_score(Some(6.0)), 4);
        assert_eq!(intent_score(Some(5.0)), 4);
        assert_eq!(intent_score(Some(4.0)), 3);
        assert_eq!(intent_score(Some(2.0)), 2);
        assert_eq!(intent_score(Some(1.0)), 1);
        assert_eq!(intent_score(None), 3);
    }

    #[test]
    fn segment_boundaries_are_exact() {
        assert_eq!(RfieSegment::from_total(15), RfieSegment::Champion);
        assert_eq!(RfieSegment::from_total(14), RfieSegment::Loyal);
        assert_eq!(RfieSegment::from_total(12), RfieSegment::Loyal);
        assert_eq!(RfieSegment::from_total(11), RfieSegment::Promising);
        assert_eq!(RfieSegment::from_total(8), RfieSegment::Promising);
        assert_eq!(RfieSegment::from_total(7), RfieSegment::AtRisk);
        assert_eq!(RfieSegment::from_total(5), RfieSegment::AtRisk);
        assert_eq!(RfieSegment::from_total(4), RfieSegment::Lost);
    }

    #[test]
    fn best_case_is_a_champion() {
        let latest = at(2024, 5, 1);
        let analyzer = RfieAnalyzer::with_reference(Some(latest));
        let record = RespondentRecord {
            response_date: Some(latest),
            intent: Some(7.0),
            subscription_eligibility: Some("1순위".to_string()),
            ..Default::default()
        };

        let assessment = analyzer.assess(&record);
        assert_eq!(assessment.total, 15);
        assert_eq!(assessment.segment, RfieSegment::Champion);
    }

    #[test]
    fn summary_counts_every_segment() {
        let analyzer = RfieAnalyzer::with_reference(None);
        let records = vec![RespondentRecord::default(), RespondentRecord::default()];
        let assessments = analyzer.assess_all(&records);

        let summary = summarize(&assessments);
        assert_eq!(summary.mean_score, Some(9.0));
        assert_eq!(summary.segments.len(), 5);
        assert_eq!(summary.count_for(RfieSegment::Promising), 2);
        assert_eq!(summary.count_for(RfieSegment::Champion), 0);

        let empty = summarize(&[]);
        assert!(empty.mean_score.is_none());
        assert!(empty.segments.iter().all(|entry| entry.count == 0));
    }
}
