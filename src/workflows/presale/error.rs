/// Failure raised inside one analysis component.
///
/// These never abort a full analysis run: the report builder turns them into
/// error markers for the failing component only.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("invalid price range {low}~{high}: bounds must be finite with low <= high")]
    InvalidPriceRange { low: f64, high: f64 },
    #[error("no parseable response date among {rows} row(s) carrying a date value")]
    UnparseableDates { rows: usize },
}
