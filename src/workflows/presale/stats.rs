use super::domain::RespondentRecord;
use serde::Serialize;

/// Most frequent answer of a categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerCount {
    pub answer: String,
    pub count: usize,
}

impl AnswerCount {
    /// Renders as `"<answer> (<n>명)"`.
    pub fn display(&self) -> String {
        format!("{} ({}명)", self.answer, self.count)
    }
}

/// Counts answers in first-seen order, sorted by count descending. Ties keep
/// the order in which the answers first appeared.
pub fn answer_counts<'a, I>(answers: I) -> Vec<AnswerCount>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: Vec<AnswerCount> = Vec::new();
    for answer in answers.into_iter().flatten() {
        match counts.iter_mut().find(|entry| entry.answer == answer) {
            Some(entry) => entry.count += 1,
            None => counts.push(AnswerCount {
                answer: answer.to_string(),
                count: 1,
            }),
        }
    }

    counts.sort_by(|left, right| right.count.cmp(&left.count));
    counts
}

pub fn top_answer<'a, I>(answers: I) -> Option<AnswerCount>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    answer_counts(answers).into_iter().next()
}

pub fn mean_intent<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a RespondentRecord>,
{
    let (sum, count) = records
        .into_iter()
        .filter_map(|record| record.intent)
        .fold((0.0, 0usize), |(sum, count), intent| (sum + intent, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Share of high-intent rows over all rows, in percent. Zero for empty input.
pub fn high_intent_pct<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a RespondentRecord>,
{
    let (high, total) = records
        .into_iter()
        .fold((0usize, 0usize), |(high, total), record| {
            (high + usize::from(record.is_high_intent()), total + 1)
        });
    percentage(high, total)
}

pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Formats a percentage with one decimal, e.g. `"12.5%"`.
pub fn format_pct(value: f64) -> String {
    format!("{:.1}%", round_to(value, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_intent(intent: Option<f64>) -> RespondentRecord {
        RespondentRecord {
            intent,
            ..Default::default()
        }
    }

    #[test]
    fn answer_counts_keep_first_seen_order_for_ties() {
        let counts = answer_counts([
            Some("84㎡"),
            Some("59㎡"),
            None,
            Some("59㎡"),
            Some("84㎡"),
        ]);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].answer, "84㎡");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[0].display(), "84㎡ (2명)");
    }

    #[test]
    fn mean_intent_skips_missing_values() {
        let records = [with_intent(Some(4.0)), with_intent(None), with_intent(Some(7.0))];
        assert_eq!(mean_intent(&records), Some(5.5));
        assert_eq!(mean_intent(&Vec::<RespondentRecord>::new()), None);
    }

    #[test]
    fn high_intent_pct_uses_all_rows_as_denominator() {
        let records = [
            with_intent(Some(6.0)),
            with_intent(None),
            with_intent(Some(2.0)),
            with_intent(Some(7.0)),
        ];
        assert_eq!(high_intent_pct(&records), 50.0);
        assert_eq!(high_intent_pct(&Vec::<RespondentRecord>::new()), 0.0);
    }

    #[test]
    fn formatting_rounds_to_one_decimal() {
        assert_eq!(format_pct(33.333), "33.3%");
        assert_eq!(format_pct(0.0), "0.0%");
        assert_eq!(round_to(4.256, 2), 4.26);
    }
}
