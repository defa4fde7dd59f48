use super::domain::RespondentRecord;
use super::stats::{high_intent_pct, mean_intent, round_to, top_answer};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const UNRESOLVED_WEEK_LABEL: &str = "미확인";

/// Weekly bucket relative to the Monday anchoring the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekLabel {
    Week {
        number: u32,
        start: NaiveDate,
        end: NaiveDate,
    },
    Unresolved,
}

impl WeekLabel {
    pub fn number(&self) -> Option<u32> {
        match self {
            WeekLabel::Week { number, .. } => Some(*number),
            WeekLabel::Unresolved => None,
        }
    }
}

impl fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekLabel::Week { number, start, end } => write!(
                f,
                "{}주차 ({}~{})",
                number,
                start.format("%m/%d"),
                end.format("%m/%d")
            ),
            WeekLabel::Unresolved => f.write_str(UNRESOLVED_WEEK_LABEL),
        }
    }
}

/// Monday of the calendar week holding the earliest date.
pub fn anchor_monday<I>(dates: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = Option<NaiveDate>>,
{
    let earliest = dates.into_iter().flatten().min()?;
    let offset = i64::from(earliest.weekday().num_days_from_monday());
    Some(earliest - Duration::days(offset))
}

fn label_for(anchor: NaiveDate, date: NaiveDate) -> WeekLabel {
    let elapsed = (date - anchor).num_days();
    let week_index = elapsed.div_euclid(7);
    let start = anchor + Duration::days(week_index * 7);

    WeekLabel::Week {
        number: u32::try_from(week_index + 1).unwrap_or(0),
        start,
        end: start + Duration::days(6),
    }
}

/// Labels every date relative to the anchor of this particular sequence.
/// Filtering the input moves the anchor, so labels are not stable across views.
pub fn assign_weeks(dates: &[Option<NaiveDate>]) -> Vec<WeekLabel> {
    let Some(anchor) = anchor_monday(dates.iter().copied()) else {
        return vec![WeekLabel::Unresolved; dates.len()];
    };

    dates
        .iter()
        .map(|date| match date {
            Some(date) => label_for(anchor, *date),
            None => WeekLabel::Unresolved,
        })
        .collect()
}

/// Aggregates used by both the trend view and the alert comparator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodMetrics {
    pub responses: usize,
    pub mean_intent: Option<f64>,
    pub high_intent_pct: f64,
}

impl PeriodMetrics {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a RespondentRecord>,
        I::IntoIter: Clone,
    {
        let records = records.into_iter();
        Self {
            responses: records.clone().count(),
            mean_intent: mean_intent(records.clone()),
            high_intent_pct: high_intent_pct(records),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPeriodStats {
    pub label: String,
    pub week: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub responses: usize,
    pub mean_intent: Option<f64>,
    pub high_intent_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_unit_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_channel: Option<String>,
}

type WeekBuckets<'a> = BTreeMap<u32, (WeekLabel, Vec<&'a RespondentRecord>)>;

fn group_by_week(records: &[RespondentRecord]) -> WeekBuckets<'_> {
    let dates: Vec<Option<NaiveDate>> = records
        .iter()
        .map(RespondentRecord::response_day)
        .collect();
    let labels = assign_weeks(&dates);

    let mut weeks = WeekBuckets::new();
    for (record, label) in records.iter().zip(labels) {
        if let Some(number) = label.number() {
            weeks
                .entry(number)
                .or_insert_with(|| (label, Vec::new()))
                .1
                .push(record);
        }
    }
    weeks
}

/// Per-week statistics ordered by week number. Rows without a date are left out.
pub fn weekly_trend(records: &[RespondentRecord]) -> Vec<WeeklyPeriodStats> {
    group_by_week(records)
        .into_iter()
        .filter_map(|(number, (label, members))| {
            let WeekLabel::Week { start, end, .. } = label else {
                return None;
            };
            let metrics = PeriodMetrics::from_records(members.iter().copied());

            Some(WeeklyPeriodStats {
                label: label.to_string(),
                week: number,
                start,
                end,
                responses: metrics.responses,
                mean_intent: metrics.mean_intent.map(|value| round_to(value, 2)),
                high_intent_pct: round_to(metrics.high_intent_pct, 1),
                top_unit_type: top_answer(
                    members.iter().map(|record| record.unit_type.as_deref()),
                )
                .map(|entry| entry.answer),
                top_channel: top_answer(members.iter().map(|record| record.channel.as_deref()))
                    .map(|entry| entry.answer),
            })
        })
        .collect()
}

/// Latest trend period compared against the trend period before it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub current_label: String,
    pub baseline_label: String,
    pub current: PeriodMetrics,
    pub baseline: PeriodMetrics,
}

/// Weeks without responses are not periods, so a gap week never becomes an
/// empty baseline.
pub fn latest_week_comparison(records: &[RespondentRecord]) -> Option<PeriodComparison> {
    let weeks = group_by_week(records);
    let mut periods = weeks.values().rev();
    let (current_label, current_members) = periods.next()?;
    let (baseline_label, baseline_members) = periods.next()?;

    Some(PeriodComparison {
        current_label: current_label.to_string(),
        baseline_label: baseline_label.to_string(),
        current: PeriodMetrics::from_records(current_members.iter().copied()),
        baseline: PeriodMetrics::from_records(baseline_members.iter().copied()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn response(date: NaiveDate, intent: f64) -> RespondentRecord {
        RespondentRecord {
            response_date: date.and_hms_opt(9, 30, 0),
            intent: Some(intent),
            ..Default::default()
        }
    }

    #[test]
    fn weeks_anchor_to_monday_of_earliest_date() {
        let labels = assign_weeks(&[Some(day(2024, 1, 3)), Some(day(2024, 1, 10))]);

        assert_eq!(labels[0].to_string(), "1주차 (01/01~01/07)");
        assert_eq!(labels[1].to_string(), "2주차 (01/08~01/14)");
    }

    #[test]
    fn missing_dates_are_unresolved() {
        let labels = assign_weeks(&[None, Some(day(2024, 1, 7)), Some(day(2024, 1, 8))]);

        assert_eq!(labels[0].to_string(), UNRESOLVED_WEEK_LABEL);
        assert_eq!(labels[1].to_string(), "1주차 (01/01~01/07)");
        assert_eq!(labels[2].to_string(), "2주차 (01/08~01/14)");
        assert!(assign_weeks(&[None]).iter().all(|label| *label == WeekLabel::Unresolved));
    }

    #[test]
    fn anchoring_follows_the_filtered_view() {
        let full = assign_weeks(&[Some(day(2024, 1, 3)), Some(day(2024, 1, 17))]);
        let sliced = assign_weeks(&[Some(day(2024, 1, 17))]);

        assert_eq!(full[1].number(), Some(3));
        assert_eq!(sliced[0].number(), Some(1));
        assert_eq!(sliced[0].to_string(), "1주차 (01/15~01/21)");
    }

    #[test]
    fn weekly_trend_aggregates_each_period() {
        let records = vec![
            response(day(2024, 1, 2), 7.0),
            response(day(2024, 1, 4), 4.0),
            RespondentRecord::default(),
            response(day(2024, 1, 9), 6.0),
        ];

        let trend = weekly_trend(&records);

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].label, "1주차 (01/01~01/07)");
        assert_eq!(trend[0].responses, 2);
        assert_eq!(trend[0].mean_intent, Some(5.5));
        assert_eq!(trend[0].high_intent_pct, 50.0);
        assert_eq!(trend[1].week, 2);
        assert_eq!(trend[1].high_intent_pct, 100.0);
    }

    #[test]
    fn comparison_uses_latest_and_preceding_week() {
        let records = vec![
            response(day(2024, 1, 2), 7.0),
            response(day(2024, 1, 3), 6.0),
            response(day(2024, 1, 9), 3.0),
        ];

        let comparison = latest_week_comparison(&records).expect("two weeks present");

        assert_eq!(comparison.current_label, "2주차 (01/08~01/14)");
        assert_eq!(comparison.baseline_label, "1주차 (01/01~01/07)");
        assert_eq!(comparison.current.responses, 1);
        assert_eq!(comparison.baseline.responses, 2);
    }

    #[test]
    fn comparison_skips_a_gap_week() {
        let mut records: Vec<RespondentRecord> = (1..=5)
            .flat_map(|date| {
                [
                    response(day(2024, 1, date), 8.0),
                    response(day(2024, 1, date), 7.0),
                ]
            })
            .collect();
        records.push(response(day(2024, 1, 16), 5.0));

        let comparison = latest_week_comparison(&records).expect("two periods present");

        assert_eq!(comparison.current_label, "3주차 (01/15~01/21)");
        assert_eq!(comparison.baseline_label, "1주차 (01/01~01/07)");
        assert_eq!(comparison.current.responses, 1);
        assert_eq!(comparison.baseline.responses, 10);
    }

    #[test]
    fn single_week_has_nothing_to_compare() {
        let records = vec![response(day(2024, 1, 2), 7.0)];
        assert!(latest_week_comparison(&records).is_none());
        assert!(latest_week_comparison(&[]).is_none());
    }

    #[test]
    fn empty_period_metrics_are_null_not_nan() {
        let metrics = PeriodMetrics::from_records(std::iter::empty::<&RespondentRecord>());
        assert_eq!(metrics.responses, 0);
        assert!(metrics.mean_intent.is_none());
        assert_eq!(metrics.high_intent_pct, 0.0);
    }
}
