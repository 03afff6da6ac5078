use crate::infra::AppState;
use assessment_scoring::scoring::{
    scoring_router, AssessmentService, ScoreNotifier, ScoreRepository,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_operational_routes<R, N>(service: Arc<AssessmentService<R, N>>) -> axum::Router
where
    R: ScoreRepository + 'static,
    N: ScoreNotifier + 'static,
{
    scoring_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryScoreRepository, RecruitmentNotifier};
    use assessment_scoring::scoring::judge::FixedCompletionClient;
    use assessment_scoring::scoring::{CriterionJudge, ScoringConfig, ScoringEngine};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let engine = ScoringEngine::new(
            Arc::new(ScoringConfig::standard().expect("standard config")),
            Duration::from_secs(25),
        );
        let service = Arc::new(AssessmentService::new(
            Arc::new(engine),
            CriterionJudge::new(Arc::new(FixedCompletionClient::standard())),
            Arc::new(InMemoryScoreRepository::default()),
            Arc::new(RecruitmentNotifier::Disabled),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_operational_routes(service).layer(Extension(state))
    }

    fn get(uri: &str) -> axum::http::Request<axum::body::Body> {
        axum::http::Request::get(uri)
            .body(axum::body::Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_tracks_the_flag() {
        let response = app(false).oneshot(get("/ready")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true).oneshot(get("/ready")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_are_plain_text() {
        let response = app(true).oneshot(get("/metrics")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn scoring_routes_are_mounted() {
        let payload = json!({
            "time_elapsed": 600,
            "main_question_score": 0.9,
            "written_answers": [
                {"question_id": "q1", "question": "What is a mutex?", "answer": "A lock."}
            ],
            "participant_name": "Ada Lovelace"
        });
        let request = axum::http::Request::post("/api/v1/assessments")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                serde_json::to_vec(&payload).expect("serialize"),
            ))
            .expect("request");

        let response = app(true).oneshot(request).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(true)
            .oneshot(get("/api/v1/skills"))
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
