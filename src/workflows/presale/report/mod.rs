mod export;
mod insights;
mod summary;
pub mod views;

pub use export::{export_to_path, write_scored_rows, SurveyExportError};
pub use insights::{REGION_LIMIT, SPOT_LIMIT};
pub use summary::{SurveyAnalysis, BASELINE_VIEW_LABEL, CURRENT_VIEW_LABEL};
pub use views::{ComponentOutcome, ScoredRecord, SurveyReport};
