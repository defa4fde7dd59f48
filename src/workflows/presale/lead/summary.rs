use super::{LeadAssessment, LeadGrade};
use crate::workflows::presale::domain::RespondentRecord;
use crate::workflows::presale::stats::{format_pct, percentage, round_to, top_answer};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeShare {
    pub grade: LeadGrade,
    pub grade_label: &'static str,
    pub count: usize,
    pub share: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadScoreSummary {
    pub total: usize,
    pub mean_score: Option<f64>,
    pub max_score: Option<u8>,
    pub min_score: Option<u8>,
    pub grades: Vec<GradeShare>,
}

impl LeadScoreSummary {
    pub fn count_for(&self, grade: LeadGrade) -> usize {
        self.grades
            .iter()
            .find(|share| share.grade == grade)
            .map(|share| share.count)
            .unwrap_or(0)
    }
}

/// Aggregates scored rows. Shares use the total row count as denominator.
pub fn summarize(assessments: &[LeadAssessment]) -> LeadScoreSummary {
    let total = assessments.len();
    let scores = assessments.iter().map(|assessment| assessment.score);

    let mean_score = if total == 0 {
        None
    } else {
        let sum: u32 = scores.clone().map(u32::from).sum();
        Some(round_to(f64::from(sum) / total as f64, 1))
    };

    let grades = LeadGrade::ordered()
        .into_iter()
        .map(|grade| {
            let count = assessments
                .iter()
                .filter(|assessment| assessment.grade == grade)
                .count();
            GradeShare {
                grade,
                grade_label: grade.label(),
                count,
                share: format_pct(percentage(count, total)),
            }
        })
        .collect();

    LeadScoreSummary {
        total,
        mean_score,
        max_score: scores.clone().max(),
        min_score: scores.min(),
        grades,
    }
}

/// Profile of the respondents inside one lead grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSegmentDetail {
    pub grade: LeadGrade,
    pub grade_label: &'static str,
    pub count: usize,
    pub share: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_unit_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_purpose: Option<String>,
}

/// Per-grade breakdown for grades holding at least one row. `records` and
/// `assessments` must be aligned by index.
pub fn segment_details(
    records: &[RespondentRecord],
    assessments: &[LeadAssessment],
) -> Vec<GradeSegmentDetail> {
    let total = records.len();

    LeadGrade::ordered()
        .into_iter()
        .filter_map(|grade| {
            let members: Vec<&RespondentRecord> = records
                .iter()
                .zip(assessments)
                .filter(|(_, assessment)| assessment.grade == grade)
                .map(|(record, _)| record)
                .collect();

            if members.is_empty() {
                return None;
            }

            Some(GradeSegmentDetail {
                grade,
                grade_label: grade.label(),
                count: members.len(),
                share: format_pct(percentage(members.len(), total)),
                top_unit_type: top_of(&members, |record| record.unit_type.as_deref()),
                top_channel: top_of(&members, |record| record.channel.as_deref()),
                top_purpose: top_of(&members, |record| record.purpose.as_deref()),
            })
        })
        .collect()
}

fn top_of<'a>(
    members: &[&'a RespondentRecord],
    select: impl Fn(&'a RespondentRecord) -> Option<&'a str>,
) -> Option<String> {
    top_answer(members.iter().map(|record| select(*record))).map(|entry| entry.answer)
}
