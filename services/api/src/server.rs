use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_operational_routes;
use assessment_scoring::config::AppConfig;
use assessment_scoring::error::AppError;
use assessment_scoring::scoring::CriterionJudge;
use assessment_scoring::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let judge = CriterionJudge::from_config(&config.judge);
    let assessment_service = Arc::new(build_service(&config, judge)?);

    let app = with_operational_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        judge = config.judge.provider.label(),
        model = %config.judge.model,
        skill_based = config.scoring.skill_based,
        webhook = config.webhook_url.is_some(),
        "assessment scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
