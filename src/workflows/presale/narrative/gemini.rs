use super::{InsightPrompt, NarrativeError, NarrativeService};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Text generation over the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiNarrativeService {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiNarrativeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiNarrativeService")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiNarrativeService {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, NarrativeError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| NarrativeError::Request(format!("failed to build client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl NarrativeService for GeminiNarrativeService {
    async fn generate(&self, prompt: &InsightPrompt) -> Result<String, NarrativeError> {
        let text = prompt.text();
        let body = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: &text }],
            }],
        };

        tracing::debug!(model = %self.model, "requesting survey narrative");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| NarrativeError::Request(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Request(format!("{status}: {detail}")));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|err| NarrativeError::Request(format!("unreadable response: {err}")))?;

        let generated: String = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if generated.trim().is_empty() {
            return Err(NarrativeError::Request("response carried no text".to_string()));
        }
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prompt() -> InsightPrompt {
        InsightPrompt {
            context: "{\"overview\": {}}".to_string(),
        }
    }

    #[tokio::test]
    async fn candidate_parts_are_joined() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_string_contains("아파트 분양"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "## 현황 요약\n" }, { "text": "리드 A급 4명" }] }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = GeminiNarrativeService::new(server.uri(), DEFAULT_GEMINI_MODEL, "test-key")
            .expect("client builds");

        let text = service.generate(&prompt()).await.expect("narrative generated");
        assert_eq!(text, "## 현황 요약\n리드 A급 4명");
    }

    #[tokio::test]
    async fn error_status_becomes_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let service = GeminiNarrativeService::new(server.uri(), "gemini-2.5-pro", "test-key")
            .expect("client builds");

        let err = service.generate(&prompt()).await.expect_err("429 fails");
        assert!(matches!(
            err,
            NarrativeError::Request(ref detail) if detail.contains("quota exceeded")
        ));
    }

    #[tokio::test]
    async fn empty_candidates_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let service = GeminiNarrativeService::new(format!("{}/", server.uri()), "m", "k")
            .expect("client builds");

        assert!(service.generate(&prompt()).await.is_err());
    }

    #[test]
    fn debug_output_omits_the_key() {
        let service = GeminiNarrativeService::new(DEFAULT_GEMINI_BASE_URL, "m", "secret-key")
            .expect("client builds");
        assert!(!format!("{service:?}").contains("secret-key"));
    }
}
