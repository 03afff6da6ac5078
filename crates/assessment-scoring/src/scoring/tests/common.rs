use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::scoring::{
    scoring_router, AssessmentId, AssessmentService, CompletionClient, CriterionJudge,
    JudgeEvaluationError, NotifyError, RecruitmentNotification, RepositoryError, ScoreNotifier,
    ScoreRecord, ScoreRepository, ScoringConfig, ScoringEngine, Submission, SubmissionPayload,
    WrittenAnswer, WrittenAnswerPayload,
};

pub(super) const FULL_REPLY: &str = "Technical Accuracy: 0.8\n\
                                     Problem Solving Methodology: 0.7\n\
                                     Logical Thinking: 0.6\n\
                                     Clarity: 0.6\n\
                                     Presentation: 0.4";

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Counts every completion and replies with a fixed body.
pub(super) struct RecordingClient {
    reply: String,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl RecordingClient {
    pub(super) fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt mutex poisoned").clone()
    }
}

#[async_trait]
impl CompletionClient for RecordingClient {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, JudgeEvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt mutex poisoned")
            .push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Fails every completion after counting it.
#[derive(Default)]
pub(super) struct FailingClient {
    calls: AtomicUsize,
}

impl FailingClient {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for FailingClient {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, JudgeEvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(JudgeEvaluationError::Status {
            status: 503,
            body: "judge unavailable".to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

/// Sleeps before replying; pairs with a paused tokio clock.
pub(super) struct SlowClient {
    pub(super) delay: Duration,
}

#[async_trait]
impl CompletionClient for SlowClient {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, JudgeEvaluationError> {
        tokio::time::sleep(self.delay).await;
        Ok(FULL_REPLY.to_string())
    }

    fn provider_name(&self) -> &'static str {
        "slow"
    }
}

pub(super) fn scoring_config() -> Arc<ScoringConfig> {
    Arc::new(ScoringConfig::standard().expect("standard configuration is valid"))
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(scoring_config(), Duration::from_secs(25))
}

pub(super) fn answer(index: usize) -> WrittenAnswer {
    WrittenAnswer {
        question_id: format!("q{index}"),
        question: format!("Explain design decision #{index}."),
        answer: format!("Answer number {index} weighs the trade-offs."),
    }
}

/// 900s of 3600 elapsed, main question at 0.75.
pub(super) fn submission(answers: usize) -> Submission {
    Submission::new(
        900,
        0.75,
        (1..=answers).map(answer).collect(),
        "Ada Lovelace",
    )
    .expect("valid submission")
}

pub(super) fn payload() -> SubmissionPayload {
    SubmissionPayload {
        time_elapsed: Some(900),
        main_question_score: Some(0.75),
        written_answers: Some(
            (1..=2)
                .map(|index| {
                    let answer = answer(index);
                    WrittenAnswerPayload {
                        question_id: Some(answer.question_id),
                        question: Some(answer.question),
                        answer: Some(answer.answer),
                    }
                })
                .collect(),
        ),
        participant_name: Some("  Ada Lovelace ".to_string()),
        instance_id: Some("inst-42".to_string()),
        email: Some("ada@example.com".to_string()),
        session_id: None,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AssessmentId, ScoreRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl ScoreRepository for MemoryRepository {
    fn insert(&self, record: ScoreRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.assessment_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.assessment_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<ScoreRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableRepository;

impl ScoreRepository for UnavailableRepository {
    fn insert(&self, _record: ScoreRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<ScoreRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<RecruitmentNotification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<RecruitmentNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl ScoreNotifier for MemoryNotifier {
    async fn notify(&self, notification: &RecruitmentNotification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification.clone());
        Ok(())
    }
}

pub(super) struct RejectingNotifier;

#[async_trait]
impl ScoreNotifier for RejectingNotifier {
    async fn notify(&self, _notification: &RecruitmentNotification) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected {
            status: 500,
            body: "webhook down".to_string(),
        })
    }
}

pub(super) fn build_service(
    client: Arc<dyn CompletionClient>,
) -> (
    AssessmentService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = AssessmentService::new(
        Arc::new(engine()),
        CriterionJudge::new(client),
        repository.clone(),
        notifier.clone(),
    );
    (service, repository, notifier)
}

pub(super) fn router_with_service(
    service: AssessmentService<MemoryRepository, MemoryNotifier>,
) -> axum::Router {
    scoring_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
