use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryNotificationGateway, InMemoryUserRepository, InMemoryVacationRepository,
};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use leave_hub::config::AppConfig;
use leave_hub::error::AppError;
use leave_hub::telemetry;
use leave_hub::workflows::directory::DirectoryService;
use leave_hub::workflows::notifications::NotificationService;
use leave_hub::workflows::vacation::VacationService;
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

    let users = Arc::new(InMemoryUserRepository::default());
    let requests = Arc::new(InMemoryVacationRepository::default());
    let gateway = Arc::new(InMemoryNotificationGateway::default());

    let directory = Arc::new(DirectoryService::new(users.clone(), gateway.clone()));
    let vacation = Arc::new(VacationService::new(
        requests,
        users.clone(),
        gateway.clone(),
    ));
    let notifications = Arc::new(NotificationService::new(users, gateway));

    let app = with_workflow_routes(directory, vacation, notifications)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "vacation workflow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
