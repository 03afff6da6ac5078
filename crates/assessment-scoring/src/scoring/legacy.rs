use tracing::debug;

use super::config::ScoringConfig;
use super::domain::{Criterion, LegacyBreakdown, Submission};
use super::judge::{CriterionJudge, Rubric};
use super::skills::time_performance;
use super::ScoringError;

/// Legacy breakdown plus the total derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegacyScore {
    pub breakdown: LegacyBreakdown,
    pub total_score: f64,
}

/// The pre-skill scoring path: a two-criterion rubric per answer and a
/// fixed weighting of time, main question and written answers.
///
/// It issues its own judge calls and shares nothing with the batched
/// skill path.
pub struct LegacyScoreCalculator<'a> {
    config: &'a ScoringConfig,
}

impl<'a> LegacyScoreCalculator<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    pub async fn legacy_score(
        &self,
        submission: &Submission,
        judge: &CriterionJudge,
    ) -> Result<LegacyScore, ScoringError> {
        let time_score =
            time_performance(submission.time_elapsed(), self.config.max_allowed_time());
        let main_question_score = submission.main_question_score();
        let written_answers_score = self.written_answers_score(submission, judge).await?;

        let weights = self.config.legacy_component_weights();
        let total_score = time_score * weights.time
            + main_question_score * weights.main_question
            + written_answers_score * weights.written_answers;

        Ok(LegacyScore {
            breakdown: LegacyBreakdown {
                time_score,
                main_question_score,
                written_answers_score,
            },
            total_score,
        })
    }

    async fn written_answers_score(
        &self,
        submission: &Submission,
        judge: &CriterionJudge,
    ) -> Result<f64, ScoringError> {
        let answers = submission.written_answers();
        if answers.is_empty() {
            return Ok(0.0);
        }

        let weights = self.config.legacy_criteria_weights();
        let mut total = 0.0;
        for answer in answers {
            let judgment = judge
                .evaluate_with(Rubric::Legacy, &answer.answer, &answer.question)
                .await
                .map_err(|source| ScoringError::Judge {
                    question_id: answer.question_id.clone(),
                    source,
                })?;
            let answer_score = judgment.score(Criterion::TechnicalAccuracy)
                * weights.technical_accuracy
                + judgment.score(Criterion::Clarity) * weights.clarity;
            debug!(question_id = %answer.question_id, answer_score, "legacy answer scored");
            total += answer_score;
        }

        Ok(total / answers.len() as f64)
    }
}
