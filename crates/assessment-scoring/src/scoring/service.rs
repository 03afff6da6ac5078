use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config::SkillDefinition;
use super::domain::{AssessmentId, ComponentBreakdown, LegacyBreakdown};
use super::engine::ScoringEngine;
use super::intake::SubmissionPayload;
use super::judge::CriterionJudge;
use super::record::{
    RecruitmentNotification, RepositoryError, ScoreNotifier, ScoreRecord, ScoreRepository,
};
use super::ScoringError;

/// Service composing intake validation, the scoring engine, persistence and
/// the recruitment notifier.
pub struct AssessmentService<R, N> {
    engine: Arc<ScoringEngine>,
    judge: CriterionJudge,
    repository: Arc<R>,
    notifier: Arc<N>,
    skill_based: bool,
}

/// Body returned to the caller after a successful scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub assessment_id: AssessmentId,
    pub participant_name: String,
    pub total_score: f64,
    pub breakdown: LegacyBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_scores: Option<IndexMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_breakdown: Option<IndexMap<String, ComponentBreakdown>>,
}

impl From<&ScoreRecord> for ScoreResponse {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            assessment_id: record.assessment_id.clone(),
            participant_name: record.participant_name.clone(),
            total_score: record.total_score,
            breakdown: LegacyBreakdown {
                time_score: record.time_score,
                main_question_score: record.main_question_score,
                written_answers_score: record.written_answers_score,
            },
            skill_scores: record.skill_scores.clone(),
            component_breakdown: record.component_breakdown.clone(),
        }
    }
}

impl<R, N> AssessmentService<R, N>
where
    R: ScoreRepository + 'static,
    N: ScoreNotifier + 'static,
{
    pub fn new(
        engine: Arc<ScoringEngine>,
        judge: CriterionJudge,
        repository: Arc<R>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            engine,
            judge,
            repository,
            notifier,
            skill_based: true,
        }
    }

    /// Toggle the batched skill path. The legacy total is always computed.
    pub fn with_skill_based_scoring(mut self, enabled: bool) -> Self {
        self.skill_based = enabled;
        self
    }

    pub fn skill_based_scoring(&self) -> bool {
        self.skill_based
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Validate, score, persist, then notify. A notifier failure is logged
    /// and does not fail the request.
    pub async fn score(
        &self,
        payload: SubmissionPayload,
    ) -> Result<ScoreResponse, AssessmentServiceError> {
        let (submission, metadata) = payload.into_submission().map_err(ScoringError::from)?;
        info!(
            participant = submission.participant_name(),
            answers = submission.written_answers().len(),
            "scoring submission"
        );

        let score = self
            .engine
            .calculate_score(&submission, &self.judge, self.skill_based)
            .await?;

        let record = ScoreRecord::new(&score, &submission, metadata, Utc::now());
        let response = ScoreResponse::from(&record);
        self.repository.insert(record.clone())?;

        if let Some(notification) = RecruitmentNotification::from_record(&record) {
            if let Err(error) = self.notifier.notify(&notification).await {
                warn!(
                    assessment_id = %record.assessment_id,
                    instance_id = %notification.instance_id,
                    %error,
                    "recruitment notification failed"
                );
            }
        }

        Ok(response)
    }

    pub fn get(&self, assessment_id: &AssessmentId) -> Result<ScoreRecord, AssessmentServiceError> {
        self.repository
            .fetch(assessment_id)?
            .ok_or_else(|| AssessmentServiceError::NotFound(assessment_id.clone()))
    }

    pub fn skills(&self) -> Vec<&SkillDefinition> {
        self.engine.config().skills().collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("assessment {0} not found")]
    NotFound(AssessmentId),
}
