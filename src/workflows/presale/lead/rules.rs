use super::config::ScoringConfig;
use super::{LeadFactor, ScoreComponent};
use crate::workflows::presale::domain::RespondentRecord;

const PRICE_NEAR_MIDPOINT: f64 = 2.0;

const RESIDENCE_KEYWORDS: [&str; 2] = ["실거주", "residence"];
const INVESTMENT_KEYWORDS: [&str; 2] = ["투자", "investment"];

const REFERRAL_KEYWORDS: [&str; 4] = ["지인", "추천", "referral", "acquaintance"];
const VISIT_KEYWORDS: [&str; 4] = ["현장", "방문", "on-site", "visit"];
const ONLINE_KEYWORDS: [&str; 4] = ["온라인", "인터넷", "online", "internet"];

pub(crate) fn score_record(
    record: &RespondentRecord,
    config: &ScoringConfig,
) -> (Vec<ScoreComponent>, u8) {
    let components = vec![
        intent_component(record.intent),
        eligibility_component(record),
        purpose_component(record.purpose.as_deref()),
        price_component(record.desired_price, config),
        channel_component(record.channel.as_deref()),
    ];
    let total = components.iter().map(|component| component.points).sum();

    (components, total)
}

fn intent_component(intent: Option<f64>) -> ScoreComponent {
    let (points, notes) = match intent {
        Some(value) if value >= 7.0 => (30, format!("intent {value} at the top of the scale")),
        Some(value) if value >= 5.0 => (20, format!("intent {value} in the 5-6 band")),
        Some(value) if value >= 3.0 => (10, format!("intent {value} in the 3-4 band")),
        Some(value) => (0, format!("intent {value} below 3")),
        None => (0, "intent not answered".to_string()),
    };

    ScoreComponent {
        factor: LeadFactor::Intent,
        points,
        notes,
    }
}

fn eligibility_component(record: &RespondentRecord) -> ScoreComponent {
    if record.is_subscription_eligible() {
        ScoreComponent {
            factor: LeadFactor::Eligibility,
            points: 25,
            notes: format!(
                "holds subscription eligibility ({})",
                record.subscription_eligibility.as_deref().unwrap_or_default()
            ),
        }
    } else {
        ScoreComponent {
            factor: LeadFactor::Eligibility,
            points: 0,
            notes: "no subscription eligibility answer".to_string(),
        }
    }
}

fn purpose_component(purpose: Option<&str>) -> ScoreComponent {
    let (points, notes) = match purpose {
        Some(label) if contains_any(label, &RESIDENCE_KEYWORDS) => {
            (15, format!("purchase for residence ({label})"))
        }
        Some(label) if contains_any(label, &INVESTMENT_KEYWORDS) => {
            (10, format!("purchase for investment ({label})"))
        }
        Some(label) => (5, format!("other purchase purpose ({label})")),
        None => (5, "purpose not answered, scored as other".to_string()),
    };

    ScoreComponent {
        factor: LeadFactor::Purpose,
        points,
        notes,
    }
}

fn price_component(price: Option<f64>, config: &ScoringConfig) -> ScoreComponent {
    let range = config.price_range;
    let (points, notes) = match price.filter(|value| value.is_finite()) {
        Some(value) if range.contains(value) => (
            20,
            format!("desired price {value} within {}~{}", range.low, range.high),
        ),
        Some(value) if (value - range.midpoint()).abs() <= PRICE_NEAR_MIDPOINT => (
            10,
            format!(
                "desired price {value} within {PRICE_NEAR_MIDPOINT} of midpoint {}",
                range.midpoint()
            ),
        ),
        Some(value) => (
            0,
            format!("desired price {value} outside {}~{}", range.low, range.high),
        ),
        None => (0, "desired price not answered".to_string()),
    };

    ScoreComponent {
        factor: LeadFactor::PriceFit,
        points,
        notes,
    }
}

fn channel_component(channel: Option<&str>) -> ScoreComponent {
    let (points, notes) = match channel.map(str::to_lowercase) {
        Some(label) if contains_any(&label, &REFERRAL_KEYWORDS) => {
            (15, format!("referral channel ({label})"))
        }
        Some(label) if contains_any(&label, &VISIT_KEYWORDS) => {
            (12, format!("on-site visit channel ({label})"))
        }
        Some(label) if contains_any(&label, &ONLINE_KEYWORDS) => {
            (8, format!("online channel ({label})"))
        }
        Some(label) => (5, format!("other channel ({label})")),
        None => (5, "channel not answered, scored as other".to_string()),
    };

    ScoreComponent {
        factor: LeadFactor::Channel,
        points,
        notes,
    }
}

fn contains_any(value: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| value.contains(keyword))
}
