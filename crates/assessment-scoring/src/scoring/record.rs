use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::domain::{AssessmentId, AssessmentScore, ComponentBreakdown, Submission, WrittenAnswer};
use super::intake::SubmissionMetadata;

/// Flat, JSON-ready record of one scored assessment: the score plus an
/// echo of the submission it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub assessment_id: AssessmentId,
    pub timestamp: DateTime<Utc>,
    pub participant_name: String,
    pub total_score: f64,
    pub time_score: f64,
    pub main_question_score: f64,
    pub written_answers_score: f64,
    pub time_elapsed: u64,
    pub main_question_score_input: f64,
    pub written_answers: Vec<WrittenAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_scores: Option<IndexMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_breakdown: Option<IndexMap<String, ComponentBreakdown>>,
}

impl ScoreRecord {
    pub fn new(
        score: &AssessmentScore,
        submission: &Submission,
        metadata: SubmissionMetadata,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            assessment_id: score.assessment_id.clone(),
            timestamp,
            participant_name: submission.participant_name().to_string(),
            total_score: score.total_score,
            time_score: score.breakdown.time_score,
            main_question_score: score.breakdown.main_question_score,
            written_answers_score: score.breakdown.written_answers_score,
            time_elapsed: submission.time_elapsed(),
            main_question_score_input: submission.main_question_score(),
            written_answers: submission.written_answers().to_vec(),
            instance_id: metadata.instance_id,
            email: metadata.email,
            session_id: metadata.session_id,
            skill_scores: score.skill_scores.clone(),
            component_breakdown: score.component_breakdown.clone(),
        }
    }
}

/// Durable store for scored assessments.
pub trait ScoreRepository: Send + Sync {
    fn insert(&self, record: ScoreRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<ScoreRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Payload pushed to the recruitment system once skill scores exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitmentNotification {
    pub instance_id: String,
    pub technical_accuracy: f64,
    pub problem_solving: f64,
    pub communication: f64,
    pub participant_name: String,
    pub total_score: f64,
    pub time_elapsed: u64,
}

impl RecruitmentNotification {
    /// `None` unless the record carries both an instance id and skill scores.
    pub fn from_record(record: &ScoreRecord) -> Option<Self> {
        let instance_id = record.instance_id.clone()?;
        let skills = record.skill_scores.as_ref()?;
        let skill = |name: &str| skills.get(name).copied().unwrap_or(0.0);

        Some(Self {
            instance_id,
            technical_accuracy: skill("technical_expertise"),
            problem_solving: skill("problem_solving"),
            communication: skill("communication"),
            participant_name: record.participant_name.clone(),
            total_score: record.total_score,
            time_elapsed: record.time_elapsed,
        })
    }
}

/// Outbound hook to the downstream recruitment system.
#[async_trait]
pub trait ScoreNotifier: Send + Sync {
    async fn notify(&self, notification: &RecruitmentNotification) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
