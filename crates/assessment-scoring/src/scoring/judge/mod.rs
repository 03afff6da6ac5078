//! LLM-backed rubric judge.
//!
//! The judge is split into a transport seam ([`CompletionClient`]) and the
//! rubric logic on top of it: prompt construction and parsing of the
//! `Criterion: score` reply into a strict [`CriterionJudgment`].

mod fixed;
mod gemini;
mod openai;
mod parser;
mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::domain::{Criterion, CriterionJudgment};
use crate::config::{JudgeConfig, JudgeProvider};

pub use fixed::FixedCompletionClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use parser::parse_judgment;

/// One completion round-trip. Implementations own transport concerns
/// (HTTP, auth, retries if any) and return the judge's raw text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, JudgeEvaluationError>;

    fn provider_name(&self) -> &'static str;
}

/// Everything that can go wrong between sending a prompt and holding text.
#[derive(Debug, thiserror::Error)]
pub enum JudgeEvaluationError {
    #[error("judge request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("judge returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("judge response envelope malformed: {0}")]
    Envelope(String),
    #[error("judge returned no candidates")]
    EmptyResponse,
}

/// Which rubric the judge applies to an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rubric {
    /// All five criteria; feeds skill-based scoring.
    Full,
    /// Technical accuracy and clarity only; feeds the legacy total.
    Legacy,
}

impl Rubric {
    pub fn criteria(&self) -> &'static [Criterion] {
        match self {
            Rubric::Full => &Criterion::ALL,
            Rubric::Legacy => &[Criterion::TechnicalAccuracy, Criterion::Clarity],
        }
    }
}

/// Scores written answers against a rubric through a completion client.
#[derive(Clone)]
pub struct CriterionJudge {
    client: Arc<dyn CompletionClient>,
}

impl CriterionJudge {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Build the client selected by configuration.
    pub fn from_config(config: &JudgeConfig) -> Self {
        let api_key = config.api_key.clone().unwrap_or_default();
        let client: Arc<dyn CompletionClient> = match config.provider {
            JudgeProvider::OpenAi => Arc::new(OpenAiClient::new(
                config.model.clone(),
                api_key,
                config.temperature,
            )),
            JudgeProvider::Gemini => Arc::new(GeminiClient::new(
                config.model.clone(),
                api_key,
                config.temperature,
            )),
            JudgeProvider::Fixed => Arc::new(FixedCompletionClient::standard()),
        };
        Self::new(client)
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Judge an answer against the full rubric.
    pub async fn evaluate(
        &self,
        answer_text: &str,
        question_context: &str,
    ) -> Result<CriterionJudgment, JudgeEvaluationError> {
        self.evaluate_with(Rubric::Full, answer_text, question_context)
            .await
    }

    pub async fn evaluate_with(
        &self,
        rubric: Rubric,
        answer_text: &str,
        question_context: &str,
    ) -> Result<CriterionJudgment, JudgeEvaluationError> {
        let prompt = prompt::build_prompt(rubric, answer_text, question_context);
        let reply = self.client.complete(prompt::SYSTEM_PROMPT, &prompt).await?;
        debug!(
            provider = self.client.provider_name(),
            ?rubric,
            reply_len = reply.len(),
            "judge reply received"
        );
        Ok(parse_judgment(&reply, rubric.criteria()))
    }
}
