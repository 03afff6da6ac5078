use indexmap::IndexMap;

use super::config::{ConfigurationError, ScoringConfig, SkillDefinition};
use super::domain::{
    ComponentBreakdown, ComponentKind, Criterion, CriterionJudgment, SkillScore, Submission,
};

/// Linear decay from 1.0 at zero seconds to 0.0 at the allowed ceiling;
/// anything past the ceiling scores 0.0.
pub fn time_performance(time_elapsed: u64, max_allowed_time: u64) -> f64 {
    if max_allowed_time == 0 || time_elapsed >= max_allowed_time {
        return 0.0;
    }
    1.0 - time_elapsed as f64 / max_allowed_time as f64
}

/// Turns batched judgments plus the submission's own fields into skill
/// scores. Never calls the judge.
pub struct SkillAggregator<'a> {
    config: &'a ScoringConfig,
}

impl<'a> SkillAggregator<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score(
        &self,
        skill: &str,
        submission: &Submission,
        judgments: &[CriterionJudgment],
    ) -> Result<SkillScore, ConfigurationError> {
        let definition = self.config.skill(skill)?;
        Ok(self.score_definition(definition, submission, judgments))
    }

    /// Every configured skill, in configuration order.
    pub fn score_all(
        &self,
        submission: &Submission,
        judgments: &[CriterionJudgment],
    ) -> IndexMap<String, SkillScore> {
        self.config
            .skills()
            .map(|definition| {
                (
                    definition.name.clone(),
                    self.score_definition(definition, submission, judgments),
                )
            })
            .collect()
    }

    fn score_definition(
        &self,
        definition: &SkillDefinition,
        submission: &Submission,
        judgments: &[CriterionJudgment],
    ) -> SkillScore {
        let mut components = ComponentBreakdown::new();
        let mut score = 0.0;

        for (component, weight) in &definition.components {
            let value = match component {
                ComponentKind::MainQuestionScore => submission.main_question_score(),
                ComponentKind::TimePerformance => {
                    time_performance(submission.time_elapsed(), self.config.max_allowed_time())
                }
                ComponentKind::WrittenAnswers => {
                    self.written_answers(&definition.written_answer_criteria, judgments)
                }
            };
            components.insert(*component, value);
            score += value * weight;
        }

        SkillScore { score, components }
    }

    /// Mean over answers of the weighted criterion average, renormalized
    /// over the skill's own criteria.
    fn written_answers(&self, criteria: &[Criterion], judgments: &[CriterionJudgment]) -> f64 {
        if judgments.is_empty() {
            return 0.0;
        }

        let total_weight: f64 = criteria
            .iter()
            .map(|criterion| self.config.criterion_weight(*criterion))
            .sum();
        if total_weight <= 0.0 {
            return 0.0;
        }

        let sum: f64 = judgments
            .iter()
            .map(|judgment| {
                let weighted: f64 = criteria
                    .iter()
                    .map(|criterion| {
                        judgment.score(*criterion) * self.config.criterion_weight(*criterion)
                    })
                    .sum();
                weighted / total_weight
            })
            .sum();

        sum / judgments.len() as f64
    }
}
