//! Assessment scoring: validated intake, LLM rubric judging, skill
//! aggregation and the legacy two-criterion total.

mod batch;
mod config;
pub mod domain;
mod engine;
pub mod intake;
pub mod judge;
mod legacy;
pub mod record;
pub mod router;
pub mod service;
mod skills;

#[cfg(test)]
mod tests;

use std::time::Duration;

pub use batch::BatchEvaluator;
pub use config::{
    ConfigurationError, LegacyComponentWeights, LegacyCriteriaWeights, RawScoringConfig,
    RawSkillDefinition, ScoringConfig, SkillDefinition,
};
pub use domain::{
    AssessmentId, AssessmentScore, ComponentBreakdown, ComponentKind, Criterion,
    CriterionJudgment, LegacyBreakdown, SkillScore, Submission, ValidationError, WrittenAnswer,
};
pub use engine::ScoringEngine;
pub use intake::{SubmissionMetadata, SubmissionPayload, WrittenAnswerPayload};
pub use judge::{CompletionClient, CriterionJudge, JudgeEvaluationError, Rubric};
pub use legacy::{LegacyScore, LegacyScoreCalculator};
pub use record::{
    NotifyError, RecruitmentNotification, RepositoryError, ScoreNotifier, ScoreRecord,
    ScoreRepository,
};
pub use router::scoring_router;
pub use service::{AssessmentService, AssessmentServiceError, ScoreResponse};
pub use skills::{time_performance, SkillAggregator};

/// Failure of a single scoring request.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to evaluate written answer '{question_id}': {source}")]
    Judge {
        question_id: String,
        #[source]
        source: JudgeEvaluationError,
    },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("scoring exceeded its {}s budget", .budget.as_secs_f64())]
    Timeout { budget: Duration },
}
