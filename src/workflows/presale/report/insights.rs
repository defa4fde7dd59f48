use super::super::domain::RespondentRecord;
use super::super::stats::{
    answer_counts, high_intent_pct, mean_intent, percentage, round_to, top_answer,
};
use super::views::{
    DailyIntake, DatasetOverview, IntakeCount, KeyMetrics, ManagerPerformance, ProspectBasis,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const SPOT_LIMIT: usize = 10;
pub const REGION_LIMIT: usize = 20;

pub(crate) fn dataset_overview(records: &[RespondentRecord]) -> DatasetOverview {
    DatasetOverview {
        total_responses: records.len(),
        mean_intent: mean_intent(records).map(|value| round_to(value, 2)),
        high_intent_count: records.iter().filter(|record| record.is_high_intent()).count(),
        top_awareness: display_top(records, |record| record.awareness.as_deref()),
        top_channel: display_top(records, |record| record.channel.as_deref()),
        top_purpose: display_top(records, |record| record.purpose.as_deref()),
        top_unit_type: display_top(records, |record| record.unit_type.as_deref()),
    }
}

fn display_top(
    records: &[RespondentRecord],
    select: fn(&RespondentRecord) -> Option<&str>,
) -> Option<String> {
    top_answer(records.iter().map(select)).map(|entry| entry.display())
}

/// Prospects come from the field staff grading when any row carries one,
/// otherwise from the high-intent answers.
pub(crate) fn key_metrics(records: &[RespondentRecord]) -> KeyMetrics {
    let graded = records
        .iter()
        .any(|record| record.consultation_grade.is_some());

    let (prospect_basis, prospects) = if graded {
        let prospects = records
            .iter()
            .filter_map(|record| record.consultation_grade)
            .filter(|grade| grade.is_prospect())
            .count();
        (ProspectBasis::ConsultationGrade, prospects)
    } else {
        let prospects = records.iter().filter(|record| record.is_high_intent()).count();
        (ProspectBasis::HighIntent, prospects)
    };

    KeyMetrics {
        total_responses: records.len(),
        prospects,
        prospect_basis,
        prospect_basis_label: prospect_basis.label(),
        conversion_pct: round_to(percentage(prospects, records.len()), 1),
    }
}

pub(crate) fn manager_performance(records: &[RespondentRecord]) -> Vec<ManagerPerformance> {
    let mut by_manager: BTreeMap<&str, Vec<&RespondentRecord>> = BTreeMap::new();
    for record in records {
        if let Some(manager) = record.manager.as_deref() {
            by_manager.entry(manager).or_default().push(record);
        }
    }

    let mut performance: Vec<ManagerPerformance> = by_manager
        .into_iter()
        .map(|(manager, members)| ManagerPerformance {
            manager: manager.to_string(),
            responses: members.len(),
            mean_intent: mean_intent(members.iter().copied()).map(|value| round_to(value, 2)),
            high_intent_count: members.iter().filter(|record| record.is_high_intent()).count(),
            high_intent_pct: round_to(high_intent_pct(members.iter().copied()), 1),
        })
        .collect();

    performance.sort_by(|left, right| right.responses.cmp(&left.responses));
    performance
}

pub(crate) fn spot_intake(records: &[RespondentRecord]) -> Vec<IntakeCount> {
    intake_counts(records.iter().map(|record| record.spot.clone()), SPOT_LIMIT)
}

/// Pairs city and district, e.g. `"서울 강남구"`. Rows missing either are skipped.
pub(crate) fn region_intake(records: &[RespondentRecord]) -> Vec<IntakeCount> {
    let regions = records.iter().map(|record| {
        match (record.city.as_deref(), record.district.as_deref()) {
            (Some(city), Some(district)) => Some(format!("{city} {district}")),
            _ => None,
        }
    });
    intake_counts(regions, REGION_LIMIT)
}

fn intake_counts<I>(names: I, limit: usize) -> Vec<IntakeCount>
where
    I: Iterator<Item = Option<String>>,
{
    let names: Vec<Option<String>> = names.collect();
    answer_counts(names.iter().map(Option::as_deref))
        .into_iter()
        .take(limit)
        .map(|entry| IntakeCount {
            name: entry.answer,
            responses: entry.count,
        })
        .collect()
}

pub(crate) fn daily_intake(records: &[RespondentRecord]) -> Vec<DailyIntake> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for day in records.iter().filter_map(RespondentRecord::response_day) {
        *per_day.entry(day).or_default() += 1;
    }

    let mut cumulative = 0;
    per_day
        .into_iter()
        .map(|(date, responses)| {
            cumulative += responses;
            DailyIntake {
                date,
                responses,
                cumulative,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::presale::domain::ConsultationGrade;

    fn on(day: u32, intent: f64) -> RespondentRecord {
        RespondentRecord {
            response_date: NaiveDate::from_ymd_opt(2024, 2, day)
                .and_then(|date| date.and_hms_opt(11, 0, 0)),
            intent: Some(intent),
            ..Default::default()
        }
    }

    #[test]
    fn overview_formats_top_answers_with_counts() {
        let records = vec![
            RespondentRecord {
                awareness: Some("처음 알았다".to_string()),
                unit_type: Some("84㎡".to_string()),
                intent: Some(7.0),
                ..Default::default()
            },
            RespondentRecord {
                awareness: Some("처음 알았다".to_string()),
                intent: Some(4.0),
                ..Default::default()
            },
        ];

        let overview = dataset_overview(&records);

        assert_eq!(overview.total_responses, 2);
        assert_eq!(overview.mean_intent, Some(5.5));
        assert_eq!(overview.high_intent_count, 1);
        assert_eq!(overview.top_awareness.as_deref(), Some("처음 알았다 (2명)"));
        assert_eq!(overview.top_unit_type.as_deref(), Some("84㎡ (1명)"));
        assert!(overview.top_channel.is_none());
    }

    #[test]
    fn key_metrics_prefer_consultation_grades() {
        let mut records = vec![on(1, 7.0), on(1, 7.0), on(2, 2.0), on(3, 3.0)];
        records[2].consultation_grade = Some(ConsultationGrade::S);
        records[3].consultation_grade = Some(ConsultationGrade::C);

        let metrics = key_metrics(&records);
        assert_eq!(metrics.prospect_basis, ProspectBasis::ConsultationGrade);
        assert_eq!(metrics.prospects, 1);
        assert_eq!(metrics.conversion_pct, 25.0);

        let ungraded = key_metrics(&[on(1, 7.0), on(1, 1.0), on(1, 6.0)]);
        assert_eq!(ungraded.prospect_basis, ProspectBasis::HighIntent);
        assert_eq!(ungraded.prospects, 2);
        assert_eq!(ungraded.conversion_pct, 66.7);
    }

    #[test]
    fn managers_sorted_by_response_volume() {
        let mut records = vec![on(1, 7.0), on(1, 3.0), on(2, 6.0)];
        records[0].manager = Some("이지은".to_string());
        records[1].manager = Some("박서준".to_string());
        records[2].manager = Some("박서준".to_string());

        let performance = manager_performance(&records);

        assert_eq!(performance[0].manager, "박서준");
        assert_eq!(performance[0].responses, 2);
        assert_eq!(performance[0].mean_intent, Some(4.5));
        assert_eq!(performance[0].high_intent_pct, 50.0);
        assert_eq!(performance[1].high_intent_count, 1);
    }

    #[test]
    fn regions_need_city_and_district() {
        let mut records = vec![on(1, 5.0), on(1, 5.0), on(1, 5.0)];
        records[0].city = Some("서울".to_string());
        records[0].district = Some("강남구".to_string());
        records[1].city = Some("서울".to_string());
        records[2].city = Some("서울".to_string());
        records[2].district = Some("강남구".to_string());

        let regions = region_intake(&records);
        assert_eq!(
            regions,
            vec![IntakeCount {
                name: "서울 강남구".to_string(),
                responses: 2
            }]
        );
    }

    #[test]
    fn spot_intake_is_capped() {
        let records: Vec<RespondentRecord> = (0..15)
            .map(|index| RespondentRecord {
                spot: Some(format!("스팟{index}")),
                ..Default::default()
            })
            .collect();

        assert_eq!(spot_intake(&records).len(), SPOT_LIMIT);
    }

    #[test]
    fn daily_intake_accumulates_in_date_order() {
        let records = vec![on(3, 5.0), on(1, 5.0), on(3, 5.0), RespondentRecord::default()];

        let daily = daily_intake(&records);

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].responses, 1);
        assert_eq!(daily[1].responses, 2);
        assert_eq!(daily[1].cumulative, 3);
    }
}
