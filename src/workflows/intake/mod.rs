//! CSV intake for pre-sales survey exports.

mod filter;
mod mapping;
mod normalizer;
mod parser;

pub use filter::SurveyFilter;

use crate::workflows::presale::domain::RespondentRecord;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum SurveyImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for SurveyImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyImportError::Io(err) => write!(f, "failed to read survey export: {}", err),
            SurveyImportError::Csv(err) => write!(f, "invalid survey CSV data: {}", err),
        }
    }
}

impl std::error::Error for SurveyImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SurveyImportError::Io(err) => Some(err),
            SurveyImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SurveyImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SurveyImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Normalized response table plus the number of incomplete surveys skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyTable {
    pub records: Vec<RespondentRecord>,
    pub incomplete_rows: usize,
}

impl SurveyTable {
    pub fn filtered(&self, filter: &SurveyFilter) -> Vec<RespondentRecord> {
        if filter.is_empty() {
            self.records.clone()
        } else {
            filter.apply(&self.records)
        }
    }
}

pub struct SurveyImporter;

impl SurveyImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<SurveyTable, SurveyImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<SurveyTable, SurveyImportError> {
        let parsed = parser::parse_records(reader)?;
        let unparsed_dates = parsed
            .records
            .iter()
            .filter(|record| record.unparsed_date.is_some())
            .count();

        tracing::info!(
            rows = parsed.records.len(),
            incomplete = parsed.incomplete_rows,
            unparsed_dates,
            "survey export imported"
        );

        Ok(SurveyTable {
            records: parsed.records,
            incomplete_rows: parsed.incomplete_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn importer_reads_inline_csv() {
        let csv = "Date,Spot,Q1_Awareness,Q6_Intent\n2024-04-01,본사,1,7\n2024-04-02,분당,,3\n";

        let table = SurveyImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(table.records.len(), 1);
        assert_eq!(table.incomplete_rows, 1);
        assert_eq!(table.records[0].spot.as_deref(), Some("본사"));
    }

    #[test]
    fn filtered_view_applies_selection() {
        let csv = "Spot,Q1_Awareness\n본사,1\n분당,2\n";
        let table = SurveyImporter::from_reader(Cursor::new(csv)).expect("import succeeds");
        let filter = SurveyFilter {
            spots: vec!["분당".to_string()],
            ..Default::default()
        };

        let view = table.filtered(&filter);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].awareness.as_deref(), Some("들어본 적 있다"));
        assert_eq!(table.filtered(&SurveyFilter::default()).len(), 2);
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = SurveyImporter::from_path("./does-not-exist.csv")
            .expect_err("expected io error");

        match error {
            SurveyImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
