use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::warn;

use super::domain::{RequestId, RequestStatus, RequestView, VacationRequest};
use super::repository::VacationRequestRepository;
use crate::workflows::directory::domain::{User, UserId};
use crate::workflows::directory::repository::{RepositoryError, UserRepository};
use crate::workflows::notifications::gateway::{
    NotificationGateway, APPROVED_WORKFLOW, REJECTED_WORKFLOW, SUBMITTED_WORKFLOW,
};

/// Service composing the request store, the user directory, and the
/// notification gateway seam.
pub struct VacationService<V, U, G> {
    requests: Arc<V>,
    users: Arc<U>,
    gateway: Arc<G>,
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("vr-{id:06}"))
}

/// Employee submission payload.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub employee_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

impl<V, U, G> VacationService<V, U, G>
where
    V: VacationRequestRepository + 'static,
    U: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    pub fn new(requests: Arc<V>, users: Arc<U>, gateway: Arc<G>) -> Self {
        Self {
            requests,
            users,
            gateway,
        }
    }

    /// Requests visible to a viewer, most-recently-created first.
    ///
    /// Role is inferred structurally: a viewer with a manager assigned is an
    /// employee and sees only their own requests; a viewer without one is
    /// treated as a manager and sees the union of their direct reports'
    /// requests.
    pub fn list_for_viewer(&self, viewer_id: &UserId) -> Result<Vec<RequestView>, VacationError> {
        let viewer = self
            .users
            .fetch(viewer_id)?
            .ok_or(VacationError::UserNotFound)?;

        let requests = if viewer.is_employee() {
            self.requests.list_for_employee(&viewer.id)?
        } else {
            let report_ids: Vec<UserId> = self
                .users
                .direct_reports(&viewer.id)?
                .into_iter()
                .map(|report| report.id)
                .collect();
            self.requests.list_for_employees(&report_ids)?
        };

        requests
            .into_iter()
            .map(|request| self.view(request))
            .collect()
    }

    /// Submit a request on behalf of an employee; it starts `Pending` and the
    /// employee's manager is notified best-effort.
    pub fn submit(&self, submission: SubmitRequest) -> Result<RequestView, VacationError> {
        let employee = self
            .users
            .fetch(&submission.employee_id)?
            .ok_or(VacationError::EmployeeNotFound)?;

        // A request cannot exist without a manager to approve it; nothing is
        // persisted in that case.
        let manager_id = employee
            .manager_id
            .clone()
            .ok_or(VacationError::NoManagerAssigned)?;

        let request = VacationRequest {
            id: next_request_id(),
            employee_id: employee.id.clone(),
            start_date: submission.start_date,
            end_date: submission.end_date,
            reason: submission.reason,
            status: RequestStatus::Pending,
            manager_notes: String::new(),
            created_at: Utc::now(),
        };
        let stored = self.requests.insert(request)?;

        self.notify_manager(&manager_id, &employee, &stored);

        self.view(stored)
    }

    /// Approve a pending request, storing the manager's notes.
    pub fn approve(
        &self,
        id: &RequestId,
        manager_notes: Option<String>,
    ) -> Result<RequestView, VacationError> {
        self.review(id, RequestStatus::Approved, manager_notes)
    }

    /// Reject a pending request, storing the manager's notes.
    pub fn reject(
        &self,
        id: &RequestId,
        manager_notes: Option<String>,
    ) -> Result<RequestView, VacationError> {
        self.review(id, RequestStatus::Rejected, manager_notes)
    }

    /// The single legal transition: `Pending` to a terminal status, exactly
    /// once. Notes from a refused second review are never applied.
    fn review(
        &self,
        id: &RequestId,
        status: RequestStatus,
        manager_notes: Option<String>,
    ) -> Result<RequestView, VacationError> {
        let mut request = self
            .requests
            .fetch(id)?
            .ok_or(VacationError::RequestNotFound)?;

        if request.status != RequestStatus::Pending {
            return Err(VacationError::NotPending);
        }

        request.status = status;
        request.manager_notes = manager_notes.unwrap_or_default();
        self.requests.update(request.clone())?;

        self.notify_employee(&request);

        self.view(request)
    }

    fn notify_manager(&self, manager_id: &UserId, employee: &User, request: &VacationRequest) {
        let manager = match self.users.fetch(manager_id) {
            Ok(Some(manager)) => manager,
            Ok(None) => {
                warn!(manager_id = %manager_id.0, "manager record missing, skipping notification");
                return;
            }
            Err(err) => {
                warn!(error = %err, "manager lookup failed, skipping notification");
                return;
            }
        };

        let mut payload = BTreeMap::new();
        payload.insert("employeeName".to_string(), employee.name.clone());
        payload.insert("startDate".to_string(), format_date(request.start_date));
        payload.insert("endDate".to_string(), format_date(request.end_date));
        payload.insert("reason".to_string(), request.reason.clone());

        if let Err(err) = self
            .gateway
            .trigger(SUBMITTED_WORKFLOW, &manager.subscriber_id, payload)
        {
            warn!(
                subscriber_id = %manager.subscriber_id,
                error = %err,
                "submission notification failed"
            );
        }
    }

    fn notify_employee(&self, request: &VacationRequest) {
        let (workflow, fallback_notes) = match request.status {
            RequestStatus::Approved => (APPROVED_WORKFLOW, "No additional notes"),
            RequestStatus::Rejected => (REJECTED_WORKFLOW, "No reason provided"),
            RequestStatus::Pending => return,
        };

        let employee = match self.users.fetch(&request.employee_id) {
            Ok(Some(employee)) => employee,
            Ok(None) => {
                warn!(
                    employee_id = %request.employee_id.0,
                    "employee record missing, skipping notification"
                );
                return;
            }
            Err(err) => {
                warn!(error = %err, "employee lookup failed, skipping notification");
                return;
            }
        };

        let manager_notes = if request.manager_notes.is_empty() {
            fallback_notes.to_string()
        } else {
            request.manager_notes.clone()
        };

        let mut payload = BTreeMap::new();
        payload.insert("startDate".to_string(), format_date(request.start_date));
        payload.insert("endDate".to_string(), format_date(request.end_date));
        payload.insert("managerNotes".to_string(), manager_notes);

        if let Err(err) = self
            .gateway
            .trigger(workflow, &employee.subscriber_id, payload)
        {
            warn!(
                subscriber_id = %employee.subscriber_id,
                error = %err,
                "review notification failed"
            );
        }
    }

    fn view(&self, request: VacationRequest) -> Result<RequestView, VacationError> {
        let employee = self
            .users
            .fetch(&request.employee_id)?
            .map(|user| user.summary());

        Ok(RequestView {
            id: request.id,
            employee,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
            status: request.status,
            manager_notes: request.manager_notes,
            created_at: request.created_at,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Error raised by the vacation workflow. Messages are the exact strings the
/// HTTP surface exposes.
#[derive(Debug, thiserror::Error)]
pub enum VacationError {
    #[error("User not found")]
    UserNotFound,
    #[error("Employee not found")]
    EmployeeNotFound,
    #[error("Request not found")]
    RequestNotFound,
    #[error("Employee does not have a manager assigned")]
    NoManagerAssigned,
    #[error("Request is not pending")]
    NotPending,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
