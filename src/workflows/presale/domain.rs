use super::error::AnalysisError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Intent answers at or above this value count as high intent (S급).
pub const HIGH_INTENT_THRESHOLD: f64 = 6.0;

/// Eligibility answers that mean "no answer" rather than a subscription tier.
const ELIGIBILITY_SENTINELS: [&str; 3] = ["", "무응답", "기타"];

/// One survey response after field normalization.
///
/// Every attribute is optional: upstream exports routinely leave cells blank and
/// the scorers resolve gaps through neutral defaults instead of rejecting rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RespondentRecord {
    pub response_date: Option<NaiveDateTime>,
    /// Raw text of a date cell that could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unparsed_date: Option<String>,
    pub manager: Option<String>,
    pub spot: Option<String>,
    pub awareness: Option<String>,
    pub channel: Option<String>,
    pub appeal: Option<String>,
    pub purpose: Option<String>,
    pub unit_type: Option<String>,
    pub intent: Option<f64>,
    pub subscription_eligibility: Option<String>,
    pub desired_price: Option<f64>,
    pub desired_price_label: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub gender: Option<String>,
    pub consultation_grade: Option<ConsultationGrade>,
}

impl RespondentRecord {
    pub fn response_day(&self) -> Option<NaiveDate> {
        self.response_date.map(|value| value.date())
    }

    pub fn is_high_intent(&self) -> bool {
        self.intent
            .map(|intent| intent >= HIGH_INTENT_THRESHOLD)
            .unwrap_or(false)
    }

    pub fn is_subscription_eligible(&self) -> bool {
        is_eligibility_answer(self.subscription_eligibility.as_deref())
    }
}

/// Shared gate for the lead scorer, the RFIE analyzer and the static advisories.
pub fn is_eligibility_answer(label: Option<&str>) -> bool {
    let Some(label) = label else {
        return false;
    };

    let trimmed = label.trim();
    if ELIGIBILITY_SENTINELS.contains(&trimmed) {
        return false;
    }

    !(trimmed.eq_ignore_ascii_case("nan") || trimmed.eq_ignore_ascii_case("null"))
}

/// Latest valid response date of a table.
///
/// Fails when rows carry date values but none of them parse. A table without
/// any date value resolves to `None`.
pub fn latest_response_date(
    records: &[RespondentRecord],
) -> Result<Option<NaiveDateTime>, AnalysisError> {
    let latest = records.iter().filter_map(|record| record.response_date).max();
    if latest.is_some() {
        return Ok(latest);
    }

    let unparsed = records
        .iter()
        .filter(|record| record.unparsed_date.is_some())
        .count();
    if unparsed > 0 {
        return Err(AnalysisError::UnparseableDates { rows: unparsed });
    }

    Ok(None)
}

/// Field staff grading captured during the consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationGrade {
    S,
    A,
    B,
    C,
}

impl ConsultationGrade {
    pub const fn ordered() -> [Self; 4] {
        [Self::S, Self::A, Self::B, Self::C]
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::S),
            2 => Some(Self::A),
            3 => Some(Self::B),
            4 => Some(Self::C),
            _ => None,
        }
    }

    /// Survey code written back on export, the inverse of `from_code`.
    pub const fn code(self) -> u8 {
        match self {
            Self::S => 1,
            Self::A => 2,
            Self::B => 3,
            Self::C => 4,
        }
    }

    /// Accepts a display label (`S (초고관심)`) or the bare letter.
    pub fn from_label(label: &str) -> Option<Self> {
        let letter = label.split_whitespace().next()?;
        Self::ordered()
            .into_iter()
            .find(|grade| grade.label().split(' ').next() == Some(letter))
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::S => "S (초고관심)",
            Self::A => "A (관심)",
            Self::B => "B (보통)",
            Self::C => "C (관리)",
        }
    }

    pub const fn is_prospect(self) -> bool {
        matches!(self, Self::S | Self::A)
    }
}
