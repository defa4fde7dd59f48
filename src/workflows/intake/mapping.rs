use super::normalizer::{clean_cell, parse_code};
use std::collections::HashMap;
use std::sync::OnceLock;

pub(crate) const UNMAPPED_ANSWER: &str = "기타";
pub(crate) const UNMAPPED_GENDER: &str = "미기재";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Question {
    Awareness,
    Channel,
    Appeal,
    Purpose,
    UnitType,
    Subscription,
    PriceBucket,
    Gender,
}

impl Question {
    const fn fallback(self) -> &'static str {
        match self {
            Self::Gender => UNMAPPED_GENDER,
            _ => UNMAPPED_ANSWER,
        }
    }
}

static CODE_TABLE: OnceLock<HashMap<(Question, u8), &'static str>> = OnceLock::new();

fn code_table() -> &'static HashMap<(Question, u8), &'static str> {
    CODE_TABLE.get_or_init(|| {
        const ANSWERS: &[(Question, &[&str])] = &[
            (
                Question::Awareness,
                &["잘 알고있다", "들어본 적 있다", "처음 알았다"],
            ),
            (
                Question::Channel,
                &[
                    "외부홍보",
                    "부동산",
                    "가족/지인",
                    "옥외광고",
                    "홈페이지",
                    "온라인광고",
                    "기사",
                ],
            ),
            (
                Question::Appeal,
                &["브랜드", "주거쾌적성", "교통환경", "교육환경", "투자가치"],
            ),
            (Question::Purpose, &["실거주", "투자", "실거주+투자"]),
            (Question::UnitType, &["59㎡", "74㎡", "75㎡", "84㎡"]),
            (
                Question::Subscription,
                &["특별공급", "1순위", "2순위", "무응답"],
            ),
            (
                Question::PriceBucket,
                &[
                    "11.5~12억",
                    "12~12.5억",
                    "12.5~13억",
                    "13~13.5억",
                    "14~14.5억",
                    "14.5~15억",
                    "15~15.5억",
                    "15.5~16억",
                ],
            ),
            (Question::Gender, &["남성", "여성"]),
        ];

        let mut table = HashMap::new();
        for (question, labels) in ANSWERS {
            for (index, label) in labels.iter().enumerate() {
                if let Ok(code) = u8::try_from(index + 1) {
                    table.insert((*question, code), *label);
                }
            }
        }
        table
    })
}

fn is_known_label(question: Question, value: &str) -> bool {
    code_table()
        .iter()
        .any(|((candidate, _), label)| *candidate == question && *label == value)
}

/// Canonical label for a raw answer cell.
///
/// Numeric codes go through the code table, cells already holding a canonical
/// label pass through, anything else collapses to the question's fallback.
/// Blank cells stay missing.
pub(crate) fn resolve_answer(question: Question, raw: Option<&str>) -> Option<String> {
    let cleaned = clean_cell(raw?)?;

    let label = match parse_code(&cleaned) {
        Some(code) => code_table()
            .get(&(question, code))
            .copied()
            .unwrap_or(question.fallback()),
        None if is_known_label(question, &cleaned) => return Some(cleaned),
        None => question.fallback(),
    };

    Some(label.to_string())
}
