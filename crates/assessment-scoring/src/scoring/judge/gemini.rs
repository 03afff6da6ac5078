use async_trait::async_trait;
use serde_json::{json, Value};

use super::{CompletionClient, JudgeEvaluationError};

const GENERATE_CONTENT_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Generate-content transport for the judge.
pub struct GeminiClient {
    model: String,
    api_key: String,
    temperature: f32,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(model: String, api_key: String, temperature: f32) -> Self {
        Self {
            model,
            api_key,
            temperature,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", GENERATE_CONTENT_BASE, self.model)
    }

    fn request_body(&self, system: &str, prompt: &str) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": system }] },
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.temperature,
                "topP": 0.8,
                "topK": 40,
            },
        })
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, JudgeEvaluationError> {
        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(system, prompt))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(JudgeEvaluationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_text(&body)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

fn extract_text(body: &str) -> Result<String, JudgeEvaluationError> {
    let envelope: Value = serde_json::from_str(body)
        .map_err(|err| JudgeEvaluationError::Envelope(err.to_string()))?;

    match envelope.get("candidates").and_then(Value::as_array) {
        Some(candidates) if !candidates.is_empty() => {}
        _ => return Err(JudgeEvaluationError::EmptyResponse),
    }

    envelope
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            JudgeEvaluationError::Envelope(
                "candidates[0].content.parts[0].text missing".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Clarity: 0.4"}]}}]}"#;
        assert_eq!(extract_text(body).expect("text"), "Clarity: 0.4");
    }

    #[test]
    fn empty_candidate_list_is_an_error() {
        let err = extract_text(r#"{"candidates":[]}"#).expect_err("empty");
        assert!(matches!(err, JudgeEvaluationError::EmptyResponse));
    }

    #[test]
    fn url_includes_model_and_method() {
        let client = GeminiClient::new("gemini-1.5-flash".to_string(), "key".to_string(), 0.2);
        assert_eq!(
            client.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
