use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryPollRepository};
use crate::routes::with_poll_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use pollboard::config::AppConfig;
use pollboard::error::AppError;
use pollboard::polls::PollService;
use pollboard::telemetry;
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

    let repository = Arc::new(InMemoryPollRepository::default());
    let poll_service = Arc::new(PollService::new(repository, config.listing.clone()));

    let app = with_poll_routes(poll_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, latest_limit = config.listing.latest_limit, "poll service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
