use super::AppState;
use crate::error::AppError;
use crate::workflows::intake::SurveyFilter;
use crate::workflows::presale::lead::{PriceRange, ScoringConfig};
use crate::workflows::presale::report::{SurveyAnalysis, SurveyReport};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::Ordering;

#[derive(Debug, Deserialize)]
pub struct SurveyAnalysisRequest {
    pub csv: String,
    /// Prior-period export compared against `csv` as a whole.
    #[serde(default)]
    pub baseline_csv: Option<String>,
    /// Overrides the configured target price band for this request only.
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub filter: SurveyFilter,
    #[serde(default)]
    pub include_rows: bool,
    #[serde(default)]
    pub narrative: bool,
}

#[derive(Debug, Serialize)]
pub struct SurveyAnalysisResponse {
    pub dataset_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_key: Option<String>,
    pub source_rows: usize,
    pub incomplete_rows: usize,
    pub analyzed_rows: usize,
    pub scoring: ScoringConfig,
    pub alert_messages: Vec<String>,
    #[serde(flatten)]
    pub report: SurveyReport,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/survey/analysis", post(survey_analysis_endpoint))
        .with_state(state)
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn survey_analysis_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<SurveyAnalysisRequest>,
) -> Result<Json<SurveyAnalysisResponse>, AppError> {
    let SurveyAnalysisRequest {
        csv,
        baseline_csv,
        price_range,
        filter,
        include_rows,
        narrative,
    } = payload;

    let (dataset_key, table) = state.load_dataset(&csv)?;
    let baseline = baseline_csv
        .as_deref()
        .map(|csv| state.load_dataset(csv))
        .transpose()?;

    let scoring = price_range
        .map(|price_range| ScoringConfig { price_range })
        .unwrap_or(state.scoring);
    let records = table.filtered(&filter);

    let mut analysis = SurveyAnalysis::new(&records)
        .with_scoring(scoring)
        .include_rows(include_rows);
    if let Some((_, baseline)) = &baseline {
        analysis = analysis.with_baseline(&baseline.records);
    }

    let mut report = analysis.run();
    if narrative {
        report.attach_narrative(state.narrative.as_ref()).await;
    }

    Ok(Json(SurveyAnalysisResponse {
        dataset_key,
        baseline_key: baseline.map(|(key, _)| key),
        source_rows: table.records.len(),
        incomplete_rows: table.incomplete_rows,
        analyzed_rows: records.len(),
        scoring,
        alert_messages: report.alert_messages(),
        report,
    }))
}
