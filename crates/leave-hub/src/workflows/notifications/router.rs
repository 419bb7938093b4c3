use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::gateway::NotificationGateway;
use super::service::{NotificationError, NotificationService};
use crate::workflows::directory::domain::UserId;
use crate::workflows::directory::repository::UserRepository;

/// Router builder exposing the test-trigger and feed-proxy endpoints.
pub fn notifications_router<R, G>(service: Arc<NotificationService<R, G>>) -> Router
where
    R: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    Router::new()
        .route("/notifications/test", post(test_handler::<R, G>))
        .route(
            "/notifications/feed/:subscriber_id",
            get(feed_handler::<R, G>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TestPayload {
    pub(crate) user_id: String,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

pub(crate) async fn test_handler<R, G>(
    State(service): State<Arc<NotificationService<R, G>>>,
    axum::Json(payload): axum::Json<TestPayload>,
) -> Response
where
    R: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    match service.send_test(&UserId(payload.user_id), payload.message) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "message": "Test notification sent successfully" })),
        )
            .into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn feed_handler<R, G>(
    State(service): State<Arc<NotificationService<R, G>>>,
    Path(subscriber_id): Path<String>,
) -> Response
where
    R: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    match service.feed(&subscriber_id) {
        Ok(feed) => (StatusCode::OK, axum::Json(feed)).into_response(),
        Err(error) => error_response(&error),
    }
}

fn error_response(error: &NotificationError) -> Response {
    let status = match error {
        NotificationError::UserNotFound => StatusCode::NOT_FOUND,
        // The whole point of these endpoints is to surface provider errors.
        NotificationError::Gateway(_) | NotificationError::Repository(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, axum::Json(json!({ "error": error.to_string() }))).into_response()
}
