use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::UserId;
use super::repository::UserRepository;
use super::service::{DirectoryError, DirectoryService};
use crate::workflows::notifications::gateway::NotificationGateway;

/// Router builder exposing the user directory endpoints.
pub fn directory_router<R, G>(service: Arc<DirectoryService<R, G>>) -> Router
where
    R: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    Router::new()
        .route(
            "/users",
            get(list_handler::<R, G>).post(create_handler::<R, G>),
        )
        .route(
            "/users/:user_id",
            get(get_handler::<R, G>).delete(delete_handler::<R, G>),
        )
        .route(
            "/users/:user_id/assign-manager",
            patch(assign_manager_handler::<R, G>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateUserRequest {
    pub(crate) name: String,
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) manager_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignManagerRequest {
    #[serde(default)]
    pub(crate) manager_id: Option<String>,
}

pub(crate) async fn list_handler<R, G>(
    State(service): State<Arc<DirectoryService<R, G>>>,
) -> Response
where
    R: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    match service.list() {
        Ok(users) => (StatusCode::OK, axum::Json(users)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn get_handler<R, G>(
    State(service): State<Arc<DirectoryService<R, G>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    match service.get(&UserId(user_id)) {
        Ok(user) => (StatusCode::OK, axum::Json(user)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn create_handler<R, G>(
    State(service): State<Arc<DirectoryService<R, G>>>,
    axum::Json(payload): axum::Json<CreateUserRequest>,
) -> Response
where
    R: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    let manager_id = payload.manager_id.map(UserId);
    match service.create(payload.name, payload.email, manager_id) {
        Ok(user) => (StatusCode::CREATED, axum::Json(user)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn assign_manager_handler<R, G>(
    State(service): State<Arc<DirectoryService<R, G>>>,
    Path(user_id): Path<String>,
    payload: Option<axum::Json<AssignManagerRequest>>,
) -> Response
where
    R: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    let payload = payload.map(|axum::Json(p)| p).unwrap_or_default();
    let manager_id = payload.manager_id.map(UserId);
    match service.assign_manager(&UserId(user_id), manager_id) {
        Ok(user) => (StatusCode::OK, axum::Json(user)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn delete_handler<R, G>(
    State(service): State<Arc<DirectoryService<R, G>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    match service.delete(&UserId(user_id)) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "message": "User deleted successfully" })),
        )
            .into_response(),
        Err(error) => error_response(&error),
    }
}

fn error_response(error: &DirectoryError) -> Response {
    let status = match error {
        DirectoryError::UserNotFound | DirectoryError::ManagerNotFound => StatusCode::NOT_FOUND,
        DirectoryError::DuplicateEmail | DirectoryError::SelfManager => StatusCode::BAD_REQUEST,
        DirectoryError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, axum::Json(json!({ "error": error.to_string() }))).into_response()
}
