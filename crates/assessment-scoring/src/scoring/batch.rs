use tracing::{debug, info};

use super::domain::{CriterionJudgment, WrittenAnswer};
use super::judge::CriterionJudge;
use super::ScoringError;

/// Judges each written answer exactly once against the full rubric so that
/// any number of skills can replay the same judgments.
pub struct BatchEvaluator<'a> {
    judge: &'a CriterionJudge,
}

impl<'a> BatchEvaluator<'a> {
    pub fn new(judge: &'a CriterionJudge) -> Self {
        Self { judge }
    }

    /// One judgment per answer, in input order. The first judge failure
    /// aborts the batch.
    pub async fn batch_evaluate(
        &self,
        answers: &[WrittenAnswer],
    ) -> Result<Vec<CriterionJudgment>, ScoringError> {
        let mut judgments = Vec::with_capacity(answers.len());

        for answer in answers {
            debug!(question_id = %answer.question_id, "judging written answer");
            let judgment = self
                .judge
                .evaluate(&answer.answer, &answer.question)
                .await
                .map_err(|source| ScoringError::Judge {
                    question_id: answer.question_id.clone(),
                    source,
                })?;
            judgments.push(judgment);
        }

        info!(
            answers = answers.len(),
            provider = self.judge.provider_name(),
            "batched written-answer evaluation complete"
        );
        Ok(judgments)
    }
}
