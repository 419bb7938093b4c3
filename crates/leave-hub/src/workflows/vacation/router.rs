use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{deserialize_date, RequestId};
use super::repository::VacationRequestRepository;
use super::service::{SubmitRequest, VacationError, VacationService};
use crate::workflows::directory::domain::UserId;
use crate::workflows::directory::repository::UserRepository;
use crate::workflows::notifications::gateway::NotificationGateway;

/// Router builder exposing the vacation-request endpoints.
pub fn vacation_router<V, U, G>(service: Arc<VacationService<V, U, G>>) -> Router
where
    V: VacationRequestRepository + 'static,
    U: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    Router::new()
        .route(
            "/vacation-requests",
            get(list_handler::<V, U, G>).post(submit_handler::<V, U, G>),
        )
        .route(
            "/vacation-requests/:request_id/approve",
            patch(approve_handler::<V, U, G>),
        )
        .route(
            "/vacation-requests/:request_id/reject",
            patch(reject_handler::<V, U, G>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListQuery {
    pub(crate) user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitPayload {
    pub(crate) employee_id: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) start_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) end_date: NaiveDate,
    pub(crate) reason: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewPayload {
    #[serde(default)]
    pub(crate) manager_notes: Option<String>,
}

pub(crate) async fn list_handler<V, U, G>(
    State(service): State<Arc<VacationService<V, U, G>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    V: VacationRequestRepository + 'static,
    U: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    let Some(user_id) = query.user_id else {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({ "error": "userId is required" })),
        )
            .into_response();
    };

    match service.list_for_viewer(&UserId(user_id)) {
        Ok(requests) => (StatusCode::OK, axum::Json(requests)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn submit_handler<V, U, G>(
    State(service): State<Arc<VacationService<V, U, G>>>,
    axum::Json(payload): axum::Json<SubmitPayload>,
) -> Response
where
    V: VacationRequestRepository + 'static,
    U: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    let submission = SubmitRequest {
        employee_id: UserId(payload.employee_id),
        start_date: payload.start_date,
        end_date: payload.end_date,
        reason: payload.reason,
    };

    match service.submit(submission) {
        Ok(request) => (StatusCode::CREATED, axum::Json(request)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn approve_handler<V, U, G>(
    State(service): State<Arc<VacationService<V, U, G>>>,
    Path(request_id): Path<String>,
    payload: Option<axum::Json<ReviewPayload>>,
) -> Response
where
    V: VacationRequestRepository + 'static,
    U: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    let payload = payload.map(|axum::Json(p)| p).unwrap_or_default();
    match service.approve(&RequestId(request_id), payload.manager_notes) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn reject_handler<V, U, G>(
    State(service): State<Arc<VacationService<V, U, G>>>,
    Path(request_id): Path<String>,
    payload: Option<axum::Json<ReviewPayload>>,
) -> Response
where
    V: VacationRequestRepository + 'static,
    U: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    let payload = payload.map(|axum::Json(p)| p).unwrap_or_default();
    match service.reject(&RequestId(request_id), payload.manager_notes) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(error) => error_response(&error),
    }
}

fn error_response(error: &VacationError) -> Response {
    let status = match error {
        VacationError::UserNotFound
        | VacationError::EmployeeNotFound
        | VacationError::RequestNotFound => StatusCode::NOT_FOUND,
        VacationError::NoManagerAssigned | VacationError::NotPending => StatusCode::BAD_REQUEST,
        VacationError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, axum::Json(json!({ "error": error.to_string() }))).into_response()
}
