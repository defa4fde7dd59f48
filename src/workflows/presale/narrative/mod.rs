//! Prompt context for the external text-generation service.
//!
//! The generator sits behind [`NarrativeService`]; [`GeminiNarrativeService`]
//! is the HTTP implementation. Its failures end up as a user-visible message
//! in the report and never touch the computed sections.

mod gemini;

pub use gemini::{GeminiNarrativeService, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

use super::report::views::{AdvancedAnalytics, DatasetOverview, SurveyReport};
use super::trend::WeeklyPeriodStats;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;

pub const NOT_CONFIGURED_MESSAGE: &str =
    "⚠️ AI 인사이트 서비스가 설정되지 않았습니다. 수치 분석 결과만 제공됩니다.";

const PROMPT_PREAMBLE: &str = "\
아파트 분양 사전영업 설문 분석 결과입니다. 마케팅 컨설턴트 관점에서 다음을 정리해 주세요.
1. 현황 요약: 인지도, 리드 등급 분포, RFIE 세그먼트 특성
2. 핵심 타겟: 우선 공략할 세그먼트와 세그먼트별 전략
3. 주차별 트렌드: 응답 수, 의향 점수, S급 비율의 변화와 전망
4. 경고 및 리스크: 즉시 대응이 필요한 이슈
5. 액션 아이템: 바로 실행 가능한 마케팅 전략 3가지
경영진 보고용으로 간결하게 마크다운으로 작성하고 수치를 적극 활용해 주세요.";

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrative service is not configured")]
    NotConfigured,
    #[error("narrative service request failed: {0}")]
    Request(String),
    #[error("unable to serialize insight context: {0}")]
    Context(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct InsightContext<'a> {
    overview: &'a DatasetOverview,
    weekly_trend: &'a [WeeklyPeriodStats],
    advanced_analytics: &'a AdvancedAnalytics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightPrompt {
    context: String,
}

impl InsightPrompt {
    pub fn from_report(report: &SurveyReport) -> Result<Self, NarrativeError> {
        let context = InsightContext {
            overview: &report.overview,
            weekly_trend: &report.weekly_trend,
            advanced_analytics: &report.advanced,
        };

        Ok(Self {
            context: serde_json::to_string_pretty(&context)?,
        })
    }

    /// Pretty JSON of the overview, weekly trend and advanced analytics.
    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn text(&self) -> String {
        format!("{PROMPT_PREAMBLE}\n\n---\n\n{}", self.context)
    }
}

#[async_trait]
pub trait NarrativeService: Debug + Send + Sync {
    async fn generate(&self, prompt: &InsightPrompt) -> Result<String, NarrativeError>;
}

/// Used whenever no generator is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNarrativeService;

#[async_trait]
impl NarrativeService for DisabledNarrativeService {
    async fn generate(&self, _prompt: &InsightPrompt) -> Result<String, NarrativeError> {
        Err(NarrativeError::NotConfigured)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NarrativeOutcome {
    Generated { text: String },
    Unavailable { message: String },
}

impl NarrativeOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Generated { text } => text,
            Self::Unavailable { message } => message,
        }
    }
}

pub async fn narrate(service: &dyn NarrativeService, report: &SurveyReport) -> NarrativeOutcome {
    let generated = match InsightPrompt::from_report(report) {
        Ok(prompt) => service.generate(&prompt).await,
        Err(err) => Err(err),
    };

    match generated {
        Ok(text) => NarrativeOutcome::Generated { text },
        Err(NarrativeError::NotConfigured) => NarrativeOutcome::Unavailable {
            message: NOT_CONFIGURED_MESSAGE.to_string(),
        },
        Err(err) => {
            tracing::warn!(error = %err, "narrative generation failed");
            NarrativeOutcome::Unavailable {
                message: format!("❌ AI 분석 중 오류가 발생했습니다: {err}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::presale::domain::RespondentRecord;
    use crate::workflows::presale::report::SurveyAnalysis;

    #[derive(Debug)]
    struct EchoService;

    #[async_trait]
    impl NarrativeService for EchoService {
        async fn generate(&self, prompt: &InsightPrompt) -> Result<String, NarrativeError> {
            Ok(format!("{} bytes of context", prompt.context().len()))
        }
    }

    #[derive(Debug)]
    struct FailingService;

    #[async_trait]
    impl NarrativeService for FailingService {
        async fn generate(&self, _prompt: &InsightPrompt) -> Result<String, NarrativeError> {
            Err(NarrativeError::Request("quota exceeded".to_string()))
        }
    }

    fn report() -> SurveyReport {
        let records = vec![RespondentRecord {
            intent: Some(6.0),
            unit_type: Some("84㎡".to_string()),
            ..Default::default()
        }];
        SurveyAnalysis::new(&records).run()
    }

    #[test]
    fn prompt_embeds_pretty_context() {
        let prompt = InsightPrompt::from_report(&report()).expect("context serializes");

        assert!(prompt.context().contains("\"overview\""));
        assert!(prompt.context().contains("\"advanced_analytics\""));
        assert!(prompt.text().starts_with("아파트 분양"));
        assert!(prompt.text().ends_with(prompt.context()));
    }

    #[tokio::test]
    async fn generated_text_is_returned() {
        let outcome = narrate(&EchoService, &report()).await;
        assert!(matches!(outcome, NarrativeOutcome::Generated { .. }));
        assert!(outcome.text().ends_with("bytes of context"));
    }

    #[tokio::test]
    async fn disabled_service_yields_unavailable_message() {
        let outcome = narrate(&DisabledNarrativeService, &report()).await;
        assert_eq!(
            outcome,
            NarrativeOutcome::Unavailable {
                message: NOT_CONFIGURED_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn service_failure_is_reported_not_raised() {
        let outcome = narrate(&FailingService, &report()).await;
        assert!(outcome.text().contains("quota exceeded"));
    }
}
