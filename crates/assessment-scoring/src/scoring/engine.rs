use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::{info, warn};

use super::batch::BatchEvaluator;
use super::config::ScoringConfig;
use super::domain::{AssessmentId, AssessmentScore, Submission};
use super::judge::CriterionJudge;
use super::legacy::LegacyScoreCalculator;
use super::skills::SkillAggregator;
use super::ScoringError;

/// Entry point for scoring one submission: legacy breakdown always,
/// skill scores on request, all under one wall-clock budget.
pub struct ScoringEngine {
    config: Arc<ScoringConfig>,
    timeout: Duration,
}

impl ScoringEngine {
    pub fn new(config: Arc<ScoringConfig>, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn available_skills(&self) -> Vec<&str> {
        self.config.skill_names()
    }

    /// Score a submission. When the budget expires the partial work is
    /// dropped and [`ScoringError::Timeout`] is returned.
    pub async fn calculate_score(
        &self,
        submission: &Submission,
        judge: &CriterionJudge,
        use_skill_based_scoring: bool,
    ) -> Result<AssessmentScore, ScoringError> {
        match tokio::time::timeout(
            self.timeout,
            self.score_within_budget(submission, judge, use_skill_based_scoring),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(budget_ms = self.timeout.as_millis() as u64, "scoring timed out");
                Err(ScoringError::Timeout {
                    budget: self.timeout,
                })
            }
        }
    }

    async fn score_within_budget(
        &self,
        submission: &Submission,
        judge: &CriterionJudge,
        use_skill_based_scoring: bool,
    ) -> Result<AssessmentScore, ScoringError> {
        let assessment_id = AssessmentId::generate();

        let legacy = LegacyScoreCalculator::new(&self.config)
            .legacy_score(submission, judge)
            .await?;

        let mut score = AssessmentScore {
            assessment_id,
            total_score: legacy.total_score,
            breakdown: legacy.breakdown,
            skill_scores: None,
            component_breakdown: None,
        };

        if use_skill_based_scoring {
            let judgments = BatchEvaluator::new(judge)
                .batch_evaluate(submission.written_answers())
                .await?;
            let skills = SkillAggregator::new(&self.config).score_all(submission, &judgments);

            let mut skill_scores = IndexMap::with_capacity(skills.len());
            let mut component_breakdown = IndexMap::with_capacity(skills.len());
            for (name, skill) in skills {
                skill_scores.insert(name.clone(), skill.score);
                component_breakdown.insert(name, skill.components);
            }
            score.skill_scores = Some(skill_scores);
            score.component_breakdown = Some(component_breakdown);
        }

        info!(
            assessment_id = %score.assessment_id,
            total_score = score.total_score,
            skill_based = use_skill_based_scoring,
            "assessment scored"
        );
        Ok(score)
    }
}
