use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::AssessmentId;
use super::intake::SubmissionPayload;
use super::record::{ScoreNotifier, ScoreRepository};
use super::service::{AssessmentService, AssessmentServiceError};
use crate::error::scoring_status;

/// Router exposing submission scoring, record lookup and the skill catalog.
pub fn scoring_router<R, N>(service: Arc<AssessmentService<R, N>>) -> Router
where
    R: ScoreRepository + 'static,
    N: ScoreNotifier + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(score_handler::<R, N>))
        .route(
            "/api/v1/assessments/:assessment_id",
            get(record_handler::<R, N>),
        )
        .route("/api/v1/skills", get(skills_handler::<R, N>))
        .with_state(service)
}

pub(crate) async fn score_handler<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    payload: Result<axum::Json<SubmissionPayload>, JsonRejection>,
) -> Response
where
    R: ScoreRepository + 'static,
    N: ScoreNotifier + 'static,
{
    let axum::Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.score(payload).await {
        Ok(score) => (StatusCode::OK, axum::Json(score)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_handler<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: ScoreRepository + 'static,
    N: ScoreNotifier + 'static,
{
    match service.get(&AssessmentId(assessment_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn skills_handler<R, N>(
    State(service): State<Arc<AssessmentService<R, N>>>,
) -> Response
where
    R: ScoreRepository + 'static,
    N: ScoreNotifier + 'static,
{
    let skills = service.skills();
    let payload = json!({
        "skills": skills,
        "skill_based_scoring": service.skill_based_scoring(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn rejection_response(rejection: JsonRejection) -> Response {
    tracing::debug!(reason = %rejection.body_text(), "rejected assessment body");
    let payload = json!({
        "error": "Invalid JSON in request body",
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::Scoring(inner) => scoring_status(inner),
        AssessmentServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!(%error, "assessment request failed");
    }

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
