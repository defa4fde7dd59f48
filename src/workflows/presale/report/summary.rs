use super::super::alerts;
use super::super::domain::{latest_response_date, RespondentRecord};
use super::super::error::AnalysisError;
use super::super::lead::{self, LeadAssessment, LeadScorer, ScoringConfig};
use super::super::narrative::{narrate, NarrativeService};
use super::super::rfie::{self, RfieAnalyzer, RfieAssessment};
use super::super::trend::{self, PeriodComparison, PeriodMetrics};
use super::insights;
use super::views::{
    AdvancedAnalytics, AlertDigest, ComponentOutcome, LeadScoringView, ScoredRecord,
    SurveyReport,
};

pub const CURRENT_VIEW_LABEL: &str = "현재 데이터";
pub const BASELINE_VIEW_LABEL: &str = "비교 기준 데이터";

/// One analysis run over an already filtered table.
#[derive(Debug, Clone)]
pub struct SurveyAnalysis<'a> {
    records: &'a [RespondentRecord],
    baseline: Option<&'a [RespondentRecord]>,
    scoring: ScoringConfig,
    include_rows: bool,
}

impl<'a> SurveyAnalysis<'a> {
    pub fn new(records: &'a [RespondentRecord]) -> Self {
        Self {
            records,
            baseline: None,
            scoring: ScoringConfig::default(),
            include_rows: false,
        }
    }

    /// Compares the whole table against a prior-period table instead of the
    /// two most recent weeks.
    pub fn with_baseline(mut self, baseline: &'a [RespondentRecord]) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn include_rows(mut self, include_rows: bool) -> Self {
        self.include_rows = include_rows;
        self
    }

    pub fn score_leads(&self) -> Result<Vec<LeadAssessment>, AnalysisError> {
        let scorer = LeadScorer::new(self.scoring)?;
        Ok(scorer.score_all(self.records))
    }

    pub fn score_rfie(&self) -> Result<Vec<RfieAssessment>, AnalysisError> {
        let analyzer = RfieAnalyzer::for_records(self.records)?;
        Ok(analyzer.assess_all(self.records))
    }

    pub fn alert_digest(&self) -> Result<AlertDigest, AnalysisError> {
        let comparison = match self.baseline {
            Some(baseline) => Some(PeriodComparison {
                current_label: CURRENT_VIEW_LABEL.to_string(),
                baseline_label: BASELINE_VIEW_LABEL.to_string(),
                current: PeriodMetrics::from_records(self.records),
                baseline: PeriodMetrics::from_records(baseline),
            }),
            None => {
                latest_response_date(self.records)?;
                trend::latest_week_comparison(self.records)
            }
        };

        let warnings = comparison
            .as_ref()
            .map(|comparison| alerts::evaluate(&comparison.current, &comparison.baseline))
            .unwrap_or_default();

        Ok(AlertDigest {
            comparison,
            warnings,
            advisories: alerts::evaluate_static(self.records),
        })
    }

    /// Source rows with derived columns, in input order.
    pub fn scored_rows(&self) -> Vec<ScoredRecord> {
        let lead_scores = isolate("lead_scoring", self.score_leads()).ok();
        let rfie_scores = isolate("rfie", self.score_rfie()).ok();
        assemble_rows(self.records, lead_scores.as_deref(), rfie_scores.as_deref())
    }

    /// Runs every component. A failing component only replaces its own slot.
    pub fn run(&self) -> SurveyReport {
        let lead_scores = isolate("lead_scoring", self.score_leads());
        let rfie_scores = isolate("rfie", self.score_rfie());
        let alert_digest = isolate("alerts", self.alert_digest());

        let rows = if self.include_rows {
            assemble_rows(
                self.records,
                lead_scores.as_deref().ok(),
                rfie_scores.as_deref().ok(),
            )
        } else {
            Vec::new()
        };

        let lead_scoring = lead_scores.map(|assessments| LeadScoringView {
            summary: lead::summarize(&assessments),
            segment_details: lead::segment_details(self.records, &assessments),
        });
        let rfie_summary = rfie_scores.map(|assessments| rfie::summarize(&assessments));

        tracing::info!(
            rows = self.records.len(),
            baseline_rows = self.baseline.map(<[RespondentRecord]>::len),
            "survey analysis completed"
        );

        SurveyReport {
            overview: insights::dataset_overview(self.records),
            key_metrics: insights::key_metrics(self.records),
            weekly_trend: trend::weekly_trend(self.records),
            advanced: AdvancedAnalytics {
                lead_scoring: ComponentOutcome::from(lead_scoring),
                rfie: ComponentOutcome::from(rfie_summary),
                alerts: ComponentOutcome::from(alert_digest),
            },
            managers: insights::manager_performance(self.records),
            spots: insights::spot_intake(self.records),
            regions: insights::region_intake(self.records),
            daily_intake: insights::daily_intake(self.records),
            narrative: None,
            rows,
        }
    }
}

fn isolate<T>(
    component: &'static str,
    result: Result<T, AnalysisError>,
) -> Result<T, AnalysisError> {
    if let Err(err) = &result {
        tracing::warn!(component, error = %err, "analysis component failed");
    }
    result
}

fn assemble_rows(
    records: &[RespondentRecord],
    leads: Option<&[LeadAssessment]>,
    rfie: Option<&[RfieAssessment]>,
) -> Vec<ScoredRecord> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| ScoredRecord {
            record: record.clone(),
            lead: leads.and_then(|leads| leads.get(index)).cloned(),
            rfie: rfie.and_then(|rfie| rfie.get(index)).copied(),
        })
        .collect()
}

impl SurveyReport {
    pub async fn attach_narrative(&mut self, service: &dyn NarrativeService) {
        let outcome = narrate(service, self).await;
        self.narrative = Some(outcome);
    }

    /// Alert strings in display order, or the failure marker of the component.
    pub fn alert_messages(&self) -> Vec<String> {
        match &self.advanced.alerts {
            ComponentOutcome::Computed(digest) => digest.messages(),
            failed => failed.failure_message().into_iter().collect(),
        }
    }
}
