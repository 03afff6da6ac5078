use assessment_scoring::config::AppConfig;
use assessment_scoring::error::AppError;
use assessment_scoring::scoring::{
    AssessmentId, AssessmentService, ConfigurationError, CriterionJudge, NotifyError,
    RecruitmentNotification, RepositoryError, ScoreNotifier, ScoreRecord, ScoreRepository,
    ScoringConfig, ScoringEngine,
};
use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ApiService = AssessmentService<InMemoryScoreRepository, RecruitmentNotifier>;

#[derive(Default, Clone)]
pub(crate) struct InMemoryScoreRepository {
    records: Arc<Mutex<HashMap<AssessmentId, ScoreRecord>>>,
}

impl ScoreRepository for InMemoryScoreRepository {
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

/// Posts skill scores to the recruitment system as JSON.
pub(crate) struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Each delivery, including reading the response, is bounded by `timeout`.
    pub(crate) fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl ScoreNotifier for WebhookNotifier {
    async fn notify(&self, notification: &RecruitmentNotification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(instance_id = %notification.instance_id, "recruitment system notified");
        Ok(())
    }
}

/// Webhook when a target is configured, otherwise a no-op.
pub(crate) enum RecruitmentNotifier {
    Webhook(WebhookNotifier),
    Disabled,
}

impl RecruitmentNotifier {
    pub(crate) fn from_url(url: Option<&str>) -> Result<Self, reqwest::Error> {
        Ok(match url {
            Some(url) => Self::Webhook(WebhookNotifier::new(url, WEBHOOK_TIMEOUT)?),
            None => Self::Disabled,
        })
    }
}

#[async_trait]
impl ScoreNotifier for RecruitmentNotifier {
    async fn notify(&self, notification: &RecruitmentNotification) -> Result<(), NotifyError> {
        match self {
            Self::Webhook(webhook) => webhook.notify(notification).await,
            Self::Disabled => {
                debug!(
                    instance_id = %notification.instance_id,
                    "no recruitment webhook configured"
                );
                Ok(())
            }
        }
    }
}

pub(crate) fn load_scoring_config(
    path: Option<&Path>,
) -> Result<ScoringConfig, ConfigurationError> {
    let config = ScoringConfig::load(path)?;
    let source = path.map_or_else(|| "built-in".to_string(), |p| p.display().to_string());
    info!(
        %source,
        skills = ?config.skill_names(),
        "scoring configuration loaded"
    );
    Ok(config)
}

/// Wire the scoring service from environment configuration.
pub(crate) fn build_service(
    config: &AppConfig,
    judge: CriterionJudge,
) -> Result<ApiService, AppError> {
    let scoring = load_scoring_config(config.scoring.config_path.as_deref())?;
    let engine = ScoringEngine::new(Arc::new(scoring), config.scoring.timeout);
    let notifier = RecruitmentNotifier::from_url(config.webhook_url.as_deref())?;

    let service = AssessmentService::new(
        Arc::new(engine),
        judge,
        Arc::new(InMemoryScoreRepository::default()),
        Arc::new(notifier),
    )
    .with_skill_based_scoring(config.scoring.skill_based);
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessment_scoring::scoring::judge::FixedCompletionClient;
    use assessment_scoring::scoring::SubmissionPayload;
    use chrono::Utc;

    fn notification() -> RecruitmentNotification {
        RecruitmentNotification {
            instance_id: "inst-1".to_string(),
            technical_accuracy: 0.7,
            problem_solving: 0.6,
            communication: 0.5,
            participant_name: "Ada Lovelace".to_string(),
            total_score: 0.65,
            time_elapsed: 1800,
        }
    }

    fn record(id: &str) -> ScoreRecord {
        ScoreRecord {
            assessment_id: AssessmentId(id.to_string()),
            timestamp: Utc::now(),
            participant_name: "Ada Lovelace".to_string(),
            total_score: 0.7,
            time_score: 0.5,
            main_question_score: 0.8,
            written_answers_score: 0.7,
            time_elapsed: 1800,
            main_question_score_input: 0.8,
            written_answers: Vec::new(),
            instance_id: Some("inst-1".to_string()),
            email: None,
            session_id: None,
            skill_scores: None,
            component_breakdown: None,
        }
    }

    #[test]
    fn repository_rejects_duplicate_ids() {
        let repository = InMemoryScoreRepository::default();

        repository.insert(record("a-1")).expect("first insert");
        assert!(matches!(
            repository.insert(record("a-1")),
            Err(RepositoryError::Conflict)
        ));
        assert!(repository
            .fetch(&AssessmentId("a-1".to_string()))
            .expect("fetch")
            .is_some());
    }

    #[tokio::test]
    async fn disabled_notifier_accepts_everything() {
        let notifier = RecruitmentNotifier::from_url(None).expect("notifier builds");

        assert!(matches!(notifier, RecruitmentNotifier::Disabled));
        notifier.notify(&notification()).await.expect("no-op");
    }

    #[test]
    fn webhook_is_selected_when_url_present() {
        let notifier =
            RecruitmentNotifier::from_url(Some("http://127.0.0.1:9/hook")).expect("notifier builds");
        assert!(matches!(notifier, RecruitmentNotifier::Webhook(_)));
    }

    /// Accepts connections and holds them open without ever responding.
    async fn silent_webhook() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        format!("http://{addr}/hook")
    }

    #[tokio::test]
    async fn stalled_webhook_times_out_as_transport_error() {
        let url = silent_webhook().await;
        let notifier =
            WebhookNotifier::new(url, Duration::from_millis(200)).expect("notifier builds");

        let err = notifier
            .notify(&notification())
            .await
            .expect_err("silent webhook must time out");

        assert!(matches!(err, NotifyError::Transport(_)));
    }

    #[tokio::test]
    async fn stalled_webhook_does_not_block_scoring() {
        let url = silent_webhook().await;
        let notifier =
            WebhookNotifier::new(url, Duration::from_millis(200)).expect("notifier builds");
        let repository = Arc::new(InMemoryScoreRepository::default());
        let service = AssessmentService::new(
            Arc::new(ScoringEngine::new(
                Arc::new(ScoringConfig::standard().expect("standard config")),
                Duration::from_secs(25),
            )),
            CriterionJudge::new(Arc::new(FixedCompletionClient::standard())),
            repository.clone(),
            Arc::new(RecruitmentNotifier::Webhook(notifier)),
        );
        let payload: SubmissionPayload = serde_json::from_value(serde_json::json!({
            "time_elapsed": 1200,
            "main_question_score": 0.8,
            "written_answers": [
                {"question_id": "q1", "question": "Explain caching.", "answer": "Keep hot data close."}
            ],
            "participant_name": "Ada Lovelace",
            "instance_id": "inst-7"
        }))
        .expect("payload");

        let response = service.score(payload).await.expect("scored despite webhook");

        assert!(response.skill_scores.is_some());
        assert!(repository
            .fetch(&response.assessment_id)
            .expect("fetch")
            .is_some());
    }
}
