use crate::cli::ServeArgs;
use crate::gateways::{HttpAgreementGateway, HttpDisbursementGateway, HttpScoringGateway};
use crate::infra::{
    AppState, InMemoryApplicationRepository, InMemoryClientDirectory, LoggingNotificationSender,
};
use crate::routes::with_application_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use lendflow::config::AppConfig;
use lendflow::error::AppError;
use lendflow::origination::{run_sweep, ApplicationService};
use lendflow::telemetry;
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

    let directory = Arc::new(InMemoryClientDirectory::default());
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let agreements = Arc::new(HttpAgreementGateway::new(
        config.collaborators.product_engine_url.clone(),
    )?);
    let scoring = Arc::new(HttpScoringGateway::new(
        config.collaborators.scoring_url.clone(),
    )?);
    let disbursement = Arc::new(HttpDisbursementGateway::new(
        config.collaborators.disbursement_url.clone(),
    )?);
    let notifications = Arc::new(LoggingNotificationSender);

    let application_service = Arc::new(ApplicationService::new(
        directory,
        repository,
        agreements,
        scoring,
        disbursement,
        notifications,
    ));

    tokio::spawn(run_sweep(
        application_service.clone(),
        config.sweep.interval(),
    ));

    let app = with_application_routes(application_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, sweep_interval_ms = config.sweep.interval_ms, "origination service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
