use async_trait::async_trait;
use serde_json::{json, Value};

use super::{CompletionClient, JudgeEvaluationError};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_TOKENS: u32 = 500;

/// Chat-completions transport for the judge.
pub struct OpenAiClient {
    model: String,
    api_key: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(model: String, api_key: String, temperature: f32) -> Self {
        Self {
            model,
            api_key,
            temperature,
            client: reqwest::Client::new(),
        }
    }

    fn request_body(&self, system: &str, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.temperature,
            "max_tokens": MAX_TOKENS,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, JudgeEvaluationError> {
        let resp = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
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

        extract_content(&body)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

fn extract_content(body: &str) -> Result<String, JudgeEvaluationError> {
    let envelope: Value = serde_json::from_str(body)
        .map_err(|err| JudgeEvaluationError::Envelope(err.to_string()))?;

    let choices = envelope
        .get("choices")
        .and_then(Value::as_array)
        .ok_or(JudgeEvaluationError::EmptyResponse)?;
    if choices.is_empty() {
        return Err(JudgeEvaluationError::EmptyResponse);
    }

    envelope
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            JudgeEvaluationError::Envelope("choices[0].message.content missing".to_string())
        })
}
