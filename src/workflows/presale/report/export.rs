use super::views::ScoredRecord;
use crate::workflows::presale::domain::ConsultationGrade;
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
pub enum SurveyExportError {
    Io(io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for SurveyExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyExportError::Io(err) => write!(f, "failed to write export: {err}"),
            SurveyExportError::Csv(err) => write!(f, "failed to encode scored rows: {err}"),
        }
    }
}

impl std::error::Error for SurveyExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SurveyExportError::Io(err) => Some(err),
            SurveyExportError::Csv(err) => Some(err),
        }
    }
}

impl From<io::Error> for SurveyExportError {
    fn from(value: io::Error) -> Self {
        SurveyExportError::Io(value)
    }
}

impl From<csv::Error> for SurveyExportError {
    fn from(value: csv::Error) -> Self {
        SurveyExportError::Csv(value)
    }
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Manager")]
    manager: Option<&'a str>,
    #[serde(rename = "Spot")]
    spot: Option<&'a str>,
    #[serde(rename = "Q1_Awareness")]
    awareness: Option<&'a str>,
    #[serde(rename = "Q2_Channel")]
    channel: Option<&'a str>,
    #[serde(rename = "Q3_Pros")]
    appeal: Option<&'a str>,
    #[serde(rename = "Q4_Purpose")]
    purpose: Option<&'a str>,
    #[serde(rename = "Q5_Type")]
    unit_type: Option<&'a str>,
    #[serde(rename = "Q6_Intent")]
    intent: Option<f64>,
    #[serde(rename = "Q7_Subscription")]
    subscription_eligibility: Option<&'a str>,
    #[serde(rename = "Q8_Price")]
    desired_price: Option<f64>,
    #[serde(rename = "Q8_Range")]
    desired_price_label: Option<&'a str>,
    #[serde(rename = "Addr_City")]
    city: Option<&'a str>,
    #[serde(rename = "Addr_Gu")]
    district: Option<&'a str>,
    #[serde(rename = "Addr_Dong")]
    neighborhood: Option<&'a str>,
    #[serde(rename = "Gender")]
    gender: Option<&'a str>,
    #[serde(rename = "Grade")]
    consultation_grade: Option<u8>,
    lead_score: Option<u8>,
    lead_grade: Option<&'static str>,
    r_score: Option<u8>,
    f_score: Option<u8>,
    i_score: Option<u8>,
    e_score: Option<u8>,
    rfie_score: Option<u8>,
    rfie_segment: Option<&'static str>,
}

impl<'a> ExportRow<'a> {
    fn from_scored(row: &'a ScoredRecord) -> Self {
        let record = &row.record;
        let date = record
            .response_date
            .map(|value| value.format(DATE_FORMAT).to_string())
            .or_else(|| record.unparsed_date.clone());

        Self {
            date,
            manager: record.manager.as_deref(),
            spot: record.spot.as_deref(),
            awareness: record.awareness.as_deref(),
            channel: record.channel.as_deref(),
            appeal: record.appeal.as_deref(),
            purpose: record.purpose.as_deref(),
            unit_type: record.unit_type.as_deref(),
            intent: record.intent,
            subscription_eligibility: record.subscription_eligibility.as_deref(),
            desired_price: record.desired_price,
            desired_price_label: record.desired_price_label.as_deref(),
            city: record.city.as_deref(),
            district: record.district.as_deref(),
            neighborhood: record.neighborhood.as_deref(),
            gender: record.gender.as_deref(),
            consultation_grade: record.consultation_grade.map(ConsultationGrade::code),
            lead_score: row.lead.as_ref().map(|lead| lead.score),
            lead_grade: row.lead.as_ref().map(|lead| lead.grade.label()),
            r_score: row.rfie.map(|rfie| rfie.recency),
            f_score: row.rfie.map(|rfie| rfie.frequency),
            i_score: row.rfie.map(|rfie| rfie.intent),
            e_score: row.rfie.map(|rfie| rfie.eligibility),
            rfie_score: row.rfie.map(|rfie| rfie.total),
            rfie_segment: row.rfie.map(|rfie| rfie.segment.label()),
        }
    }
}

/// Writes scored rows as CSV in input order, header included.
pub fn write_scored_rows<W: io::Write>(
    rows: &[ScoredRecord],
    writer: W,
) -> Result<(), SurveyExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(ExportRow::from_scored(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_to_path<P: AsRef<Path>>(
    rows: &[ScoredRecord],
    path: P,
) -> Result<(), SurveyExportError> {
    let file = File::create(path.as_ref())?;
    write_scored_rows(rows, file)?;
    tracing::info!(
        rows = rows.len(),
        path = %path.as_ref().display(),
        "scored rows exported"
    );
    Ok(())
}
