use async_trait::async_trait;

use super::{CompletionClient, JudgeEvaluationError};

/// Returns the same reply for every prompt. Lets the service and CLI run
/// end to end without network access or an API key.
#[derive(Debug, Clone)]
pub struct FixedCompletionClient {
    reply: String,
}

impl FixedCompletionClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    /// A middling answer on every criterion.
    pub fn standard() -> Self {
        Self::new(
            "Technical Accuracy: 0.7\n\
             Problem Solving Methodology: 0.6\n\
             Logical Thinking: 0.65\n\
             Clarity: 0.6\n\
             Presentation: 0.55",
        )
    }
}

#[async_trait]
impl CompletionClient for FixedCompletionClient {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, JudgeEvaluationError> {
        Ok(self.reply.clone())
    }

    fn provider_name(&self) -> &'static str {
        "fixed"
    }
}
