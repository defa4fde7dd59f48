use super::domain::RespondentRecord;
use super::stats::{answer_counts, mean_intent, percentage};
use super::trend::PeriodMetrics;
use serde::Serialize;
use std::fmt;

/// Response count change (percent) at or below which a drop is reported.
pub const RESPONSE_DROP_PCT: f64 = -20.0;
/// Mean intent change (points) at or below which a drop is reported.
pub const INTENT_DROP_POINTS: f64 = -0.5;
/// High-intent ratio change (percentage points) at or below which a drop is reported.
pub const HIGH_INTENT_DROP_PP: f64 = -5.0;

pub const LOW_MEAN_INTENT: f64 = 5.0;
pub const LOW_ELIGIBLE_PCT: f64 = 30.0;
pub const UNIT_TYPE_CONCENTRATION_PCT: f64 = 50.0;

const WARNING_PREFIX: &str = "⚠️";
const ADVISORY_PREFIX: &str = "💡";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ResponseCountDrop,
    MeanIntentDrop,
    HighIntentRatioDrop,
    LowMeanIntent,
    LowEligibility,
    UnitTypeConcentration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Advisory,
}

impl AlertKind {
    pub const fn severity(self) -> AlertSeverity {
        match self {
            Self::ResponseCountDrop | Self::MeanIntentDrop | Self::HighIntentRatioDrop => {
                AlertSeverity::Warning
            }
            Self::LowMeanIntent | Self::LowEligibility | Self::UnitTypeConcentration => {
                AlertSeverity::Advisory
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
}

impl Alert {
    fn warning(kind: AlertKind, body: String) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: format!("{WARNING_PREFIX} {body}"),
        }
    }

    fn advisory(kind: AlertKind, body: String) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: format!("{ADVISORY_PREFIX} {body}"),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub fn messages(alerts: &[Alert]) -> Vec<String> {
    alerts.iter().map(|alert| alert.message.clone()).collect()
}

/// Compares a period against its baseline. Rules fire in a fixed order:
/// response count, mean intent, high-intent ratio.
pub fn evaluate(current: &PeriodMetrics, baseline: &PeriodMetrics) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if baseline.responses > 0 {
        let change_pct = (current.responses as f64 - baseline.responses as f64)
            / baseline.responses as f64
            * 100.0;
        if change_pct <= RESPONSE_DROP_PCT {
            alerts.push(Alert::warning(
                AlertKind::ResponseCountDrop,
                format!(
                    "응답 수 {:.1}% 감소 ({} → {})",
                    change_pct.abs(),
                    baseline.responses,
                    current.responses
                ),
            ));
        }
    }

    if let (Some(current_mean), Some(baseline_mean)) = (current.mean_intent, baseline.mean_intent)
    {
        let change = current_mean - baseline_mean;
        if change <= INTENT_DROP_POINTS {
            alerts.push(Alert::warning(
                AlertKind::MeanIntentDrop,
                format!(
                    "평균 의향 점수 {:.2}점 하락 ({:.2} → {:.2})",
                    change.abs(),
                    baseline_mean,
                    current_mean
                ),
            ));
        }
    }

    if baseline.high_intent_pct > 0.0 {
        let change = current.high_intent_pct - baseline.high_intent_pct;
        if change <= HIGH_INTENT_DROP_PP {
            alerts.push(Alert::warning(
                AlertKind::HighIntentRatioDrop,
                format!(
                    "S급 고객 비율 {:.1}%p 감소 ({:.1}% → {:.1}%)",
                    change.abs(),
                    baseline.high_intent_pct,
                    current.high_intent_pct
                ),
            ));
        }
    }

    alerts
}

/// Baseline-free advisories for one dataset. An empty dataset yields none.
pub fn evaluate_static(records: &[RespondentRecord]) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let total = records.len();
    if total == 0 {
        return alerts;
    }

    if let Some(mean) = mean_intent(records) {
        if mean < LOW_MEAN_INTENT {
            alerts.push(Alert::advisory(
                AlertKind::LowMeanIntent,
                format!("평균 의향 점수가 {mean:.1}점으로 낮습니다. 타겟팅 전략 검토가 필요합니다."),
            ));
        }
    }

    // Uploads without Q7 answers say nothing about eligibility.
    let eligibility_answered = records
        .iter()
        .any(|record| record.subscription_eligibility.is_some());
    if eligibility_answered {
        let eligible = records
            .iter()
            .filter(|record| record.is_subscription_eligible())
            .count();
        let eligible_pct = percentage(eligible, total);
        if eligible_pct < LOW_ELIGIBLE_PCT {
            alerts.push(Alert::advisory(
                AlertKind::LowEligibility,
                format!(
                    "청약 자격 보유율이 {eligible_pct:.1}%로 낮습니다. 청약 가이드 콘텐츠 강화를 권장합니다."
                ),
            ));
        }
    }

    let unit_types = answer_counts(records.iter().map(|record| record.unit_type.as_deref()));
    if let Some(top) = unit_types.first() {
        let share = percentage(top.count, total);
        if share >= UNIT_TYPE_CONCENTRATION_PCT {
            alerts.push(Alert::advisory(
                AlertKind::UnitTypeConcentration,
                format!(
                    "'{}' 평형이 {share:.1}%로 집중되어 있습니다. 재고 관리에 주의하세요.",
                    top.answer
                ),
            ));
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(responses: usize, mean_intent: Option<f64>, high_intent_pct: f64) -> PeriodMetrics {
        PeriodMetrics {
            responses,
            mean_intent,
            high_intent_pct,
        }
    }

    fn kinds(alerts: &[Alert]) -> Vec<AlertKind> {
        alerts.iter().map(|alert| alert.kind).collect()
    }

    #[test]
    fn count_drop_fires_at_twenty_five_percent() {
        let alerts = evaluate(&period(75, None, 0.0), &period(100, None, 0.0));

        assert_eq!(kinds(&alerts), vec![AlertKind::ResponseCountDrop]);
        assert_eq!(alerts[0].message, "⚠️ 응답 수 25.0% 감소 (100 → 75)");
    }

    #[test]
    fn count_drop_is_silent_at_fifteen_percent() {
        let alerts = evaluate(&period(85, None, 0.0), &period(100, None, 0.0));
        assert!(alerts.is_empty());
    }

    #[test]
    fn count_drop_includes_the_exact_threshold() {
        let alerts = evaluate(&period(80, None, 0.0), &period(100, None, 0.0));
        assert_eq!(kinds(&alerts), vec![AlertKind::ResponseCountDrop]);
    }

    #[test]
    fn empty_baseline_never_triggers_count_drop() {
        assert!(evaluate(&period(0, None, 0.0), &period(0, None, 0.0)).is_empty());
    }

    #[test]
    fn rules_fire_in_fixed_order() {
        let alerts = evaluate(&period(10, Some(4.0), 10.0), &period(20, Some(5.0), 30.0));

        assert_eq!(
            kinds(&alerts),
            vec![
                AlertKind::ResponseCountDrop,
                AlertKind::MeanIntentDrop,
                AlertKind::HighIntentRatioDrop
            ]
        );
        assert_eq!(alerts[1].message, "⚠️ 평균 의향 점수 1.00점 하락 (5.00 → 4.00)");
        assert_eq!(alerts[2].message, "⚠️ S급 고객 비율 20.0%p 감소 (30.0% → 10.0%)");
        assert!(alerts
            .iter()
            .all(|alert| alert.severity == AlertSeverity::Warning));
    }

    #[test]
    fn intent_drop_requires_both_means() {
        let alerts = evaluate(&period(10, None, 0.0), &period(10, Some(6.0), 0.0));
        assert!(alerts.is_empty());
    }

    #[test]
    fn static_advisories_report_values_with_one_decimal() {
        let records: Vec<RespondentRecord> = (0..4)
            .map(|index| RespondentRecord {
                intent: Some(4.0),
                unit_type: Some(if index < 3 { "84㎡" } else { "59㎡" }.to_string()),
                subscription_eligibility: Some("무응답".to_string()),
                ..Default::default()
            })
            .collect();

        let alerts = evaluate_static(&records);

        assert_eq!(
            kinds(&alerts),
            vec![
                AlertKind::LowMeanIntent,
                AlertKind::LowEligibility,
                AlertKind::UnitTypeConcentration
            ]
        );
        assert!(alerts[0].message.contains("4.0점"));
        assert!(alerts[1].message.contains("0.0%"));
        assert!(alerts[2].message.contains("'84㎡' 평형이 75.0%"));
        assert!(alerts[2].message.starts_with("💡"));
    }

    #[test]
    fn healthy_dataset_has_no_advisories() {
        let records: Vec<RespondentRecord> = ["59㎡", "74㎡", "84㎡"]
            .into_iter()
            .map(|unit| RespondentRecord {
                intent: Some(6.0),
                unit_type: Some(unit.to_string()),
                subscription_eligibility: Some("1순위".to_string()),
                ..Default::default()
            })
            .collect();

        assert!(evaluate_static(&records).is_empty());
        assert!(evaluate_static(&[]).is_empty());
    }

    #[test]
    fn eligibility_advisory_needs_eligibility_answers() {
        let records: Vec<RespondentRecord> = ["59㎡", "74㎡", "84㎡"]
            .into_iter()
            .map(|unit| RespondentRecord {
                intent: Some(6.0),
                unit_type: Some(unit.to_string()),
                ..Default::default()
            })
            .collect();

        assert!(evaluate_static(&records).is_empty());
    }
}
