use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use leave_hub::workflows::directory::{directory_router, DirectoryService, UserRepository};
use leave_hub::workflows::notifications::{
    notifications_router, NotificationGateway, NotificationService,
};
use leave_hub::workflows::vacation::{vacation_router, VacationRequestRepository, VacationService};

/// Compose the workflow routers with the operational endpoints.
pub(crate) fn with_workflow_routes<U, V, G>(
    directory: Arc<DirectoryService<U, G>>,
    vacation: Arc<VacationService<V, U, G>>,
    notifications: Arc<NotificationService<U, G>>,
) -> axum::Router
where
    U: UserRepository + 'static,
    V: VacationRequestRepository + 'static,
    G: NotificationGateway + 'static,
{
    directory_router(directory)
        .merge(vacation_router(vacation))
        .merge(notifications_router(notifications))
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
