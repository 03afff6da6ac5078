use crate::config::ConfigError;
use crate::scoring::{AssessmentServiceError, ConfigurationError, ScoringError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Top-level failure for the binaries: startup, serving and one-shot CLI
/// scoring.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    ScoringConfig(ConfigurationError),
    Scoring(ScoringError),
    Assessment(AssessmentServiceError),
    Json(serde_json::Error),
    Http(reqwest::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::ScoringConfig(err) => write!(f, "scoring configuration error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
            AppError::Assessment(err) => write!(f, "assessment error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
            AppError::Http(err) => write!(f, "http client error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::ScoringConfig(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Assessment(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Http(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Scoring(err) | AppError::Assessment(AssessmentServiceError::Scoring(err)) => {
                scoring_status(err)
            }
            AppError::Assessment(AssessmentServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::ScoringConfig(_)
            | AppError::Http(_)
            | AppError::Assessment(AssessmentServiceError::Repository(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// HTTP status for a failed scoring run.
pub fn scoring_status(error: &ScoringError) -> StatusCode {
    match error {
        ScoringError::Validation(_) => StatusCode::BAD_REQUEST,
        ScoringError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
        ScoringError::Judge { .. } => StatusCode::BAD_GATEWAY,
        ScoringError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ConfigurationError> for AppError {
    fn from(value: ConfigurationError) -> Self {
        Self::ScoringConfig(value)
    }
}

impl From<ScoringError> for AppError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

impl From<AssessmentServiceError> for AppError {
    fn from(value: AssessmentServiceError) -> Self {
        Self::Assessment(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}
