use super::mapping::{resolve_answer, Question};
use super::normalizer::{clean_cell, parse_code, parse_number};
use crate::workflows::presale::domain::{ConsultationGrade, RespondentRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::io::Read;

const AWARENESS_HEADER: &str = "Q1_Awareness";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

#[derive(Debug, Default)]
pub(crate) struct ParsedSurvey {
    pub(crate) records: Vec<RespondentRecord>,
    pub(crate) incomplete_rows: usize,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<ParsedSurvey, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: csv::StringRecord = csv_reader
        .headers()?
        .iter()
        .map(|header| clean_cell(header).unwrap_or_default())
        .collect();
    let requires_awareness = headers.iter().any(|header| header == AWARENESS_HEADER);
    csv_reader.set_headers(headers);

    let mut parsed = ParsedSurvey::default();
    for row in csv_reader.deserialize::<SurveyRow>() {
        let row = row?;
        if requires_awareness && row.awareness.is_none() {
            parsed.incomplete_rows += 1;
            continue;
        }
        parsed.records.push(row.into_record());
    }

    Ok(parsed)
}

#[derive(Debug, Deserialize)]
struct SurveyRow {
    #[serde(rename = "Date", default, deserialize_with = "empty_string_as_none")]
    date: Option<String>,
    #[serde(rename = "Manager", default, deserialize_with = "empty_string_as_none")]
    manager: Option<String>,
    #[serde(rename = "Spot", default, deserialize_with = "empty_string_as_none")]
    spot: Option<String>,
    #[serde(
        rename = "Q1_Awareness",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    awareness: Option<String>,
    #[serde(
        rename = "Q2_Channel",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    channel: Option<String>,
    #[serde(rename = "Q3_Pros", default, deserialize_with = "empty_string_as_none")]
    appeal: Option<String>,
    #[serde(
        rename = "Q4_Purpose",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    purpose: Option<String>,
    #[serde(rename = "Q5_Type", default, deserialize_with = "empty_string_as_none")]
    unit_type: Option<String>,
    #[serde(
        rename = "Q6_Intent",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    intent: Option<String>,
    #[serde(
        rename = "Q7_Subscription",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    subscription: Option<String>,
    #[serde(rename = "Q8_Price", default, deserialize_with = "empty_string_as_none")]
    price: Option<String>,
    #[serde(
        rename = "Addr_City",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    city: Option<String>,
    #[serde(rename = "Addr_Gu", default, deserialize_with = "empty_string_as_none")]
    district: Option<String>,
    #[serde(
        rename = "Addr_Dong",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    neighborhood: Option<String>,
    #[serde(rename = "Gender", default, deserialize_with = "empty_string_as_none")]
    gender: Option<String>,
    #[serde(rename = "Grade", default, deserialize_with = "empty_string_as_none")]
    grade: Option<String>,
}

impl SurveyRow {
    fn into_record(self) -> RespondentRecord {
        let response_date = self.date.as_deref().and_then(parse_datetime);
        let unparsed_date = match response_date {
            Some(_) => None,
            None => self.date.clone(),
        };
        let desired_price = self.price.as_deref().and_then(parse_number);

        RespondentRecord {
            response_date,
            unparsed_date,
            manager: self.manager.as_deref().and_then(clean_cell),
            spot: self.spot.as_deref().and_then(clean_cell),
            awareness: resolve_answer(Question::Awareness, self.awareness.as_deref()),
            channel: resolve_answer(Question::Channel, self.channel.as_deref()),
            appeal: resolve_answer(Question::Appeal, self.appeal.as_deref()),
            purpose: resolve_answer(Question::Purpose, self.purpose.as_deref()),
            unit_type: resolve_answer(Question::UnitType, self.unit_type.as_deref()),
            intent: self.intent.as_deref().and_then(parse_number),
            subscription_eligibility: resolve_answer(
                Question::Subscription,
                self.subscription.as_deref(),
            ),
            desired_price,
            desired_price_label: resolve_answer(Question::PriceBucket, self.price.as_deref()),
            city: self.city.as_deref().and_then(clean_cell),
            district: self.district.as_deref().and_then(clean_cell),
            neighborhood: self.neighborhood.as_deref().and_then(clean_cell),
            gender: resolve_answer(Question::Gender, self.gender.as_deref()),
            consultation_grade: self.grade.as_deref().and_then(parse_grade),
        }
    }
}

/// Survey code first, then a previously exported label.
fn parse_grade(value: &str) -> Option<ConsultationGrade> {
    match parse_code(value) {
        Some(code) => ConsultationGrade::from_code(code),
        None => clean_cell(value).and_then(|label| ConsultationGrade::from_label(&label)),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
