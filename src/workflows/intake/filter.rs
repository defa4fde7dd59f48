use crate::workflows::presale::domain::RespondentRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Narrows a response table before analysis. Empty selections match every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub spots: Vec<String>,
    pub managers: Vec<String>,
    pub cities: Vec<String>,
    pub districts: Vec<String>,
}

impl SurveyFilter {
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.spots.is_empty()
            && self.managers.is_empty()
            && self.cities.is_empty()
            && self.districts.is_empty()
    }

    /// Rows without a date never pass a date bound.
    pub fn matches(&self, record: &RespondentRecord) -> bool {
        if self.date_from.is_some() || self.date_to.is_some() {
            let Some(day) = record.response_day() else {
                return false;
            };
            if self.date_from.is_some_and(|from| day < from) {
                return false;
            }
            if self.date_to.is_some_and(|to| day > to) {
                return false;
            }
        }

        selected(&self.spots, record.spot.as_deref())
            && selected(&self.managers, record.manager.as_deref())
            && selected(&self.cities, record.city.as_deref())
            && selected(&self.districts, record.district.as_deref())
    }

    pub fn apply(&self, records: &[RespondentRecord]) -> Vec<RespondentRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

fn selected(choices: &[String], value: Option<&str>) -> bool {
    if choices.is_empty() {
        return true;
    }
    value.is_some_and(|value| choices.iter().any(|choice| choice == value))
}
