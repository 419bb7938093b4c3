use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::directory::domain::{User, UserId};
use crate::workflows::directory::repository::{RepositoryError, UserRepository};
use crate::workflows::notifications::gateway::{
    GatewayError, NotificationGateway, SubscriberProfile,
};
use crate::workflows::vacation::domain::{RequestId, VacationRequest};
use crate::workflows::vacation::repository::VacationRequestRepository;
use crate::workflows::vacation::service::{SubmitRequest, VacationService};

pub(super) fn build_service() -> (
    VacationService<MemoryRequests, MemoryUsers, MemoryGateway>,
    Arc<MemoryRequests>,
    Arc<MemoryUsers>,
    Arc<MemoryGateway>,
) {
    let requests = Arc::new(MemoryRequests::default());
    let users = Arc::new(MemoryUsers::default());
    let gateway = Arc::new(MemoryGateway::default());
    let service = VacationService::new(requests.clone(), users.clone(), gateway.clone());
    (service, requests, users, gateway)
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Seed a user directly in the repository; `seq` orders creation time so
/// listing assertions stay deterministic.
pub(super) fn seed_user(
    users: &MemoryUsers,
    seq: u32,
    name: &str,
    manager_id: Option<&UserId>,
) -> User {
    let created_at = Utc
        .with_ymd_and_hms(2024, 1, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
        + chrono::Duration::seconds(seq.into());
    let user = User {
        id: UserId(format!("usr-{seq:06}")),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_ascii_lowercase().replace(' ', ".")),
        subscriber_id: format!("user-1704096000000-{seq:06}"),
        manager_id: manager_id.cloned(),
        created_at,
    };
    users.insert(user.clone()).expect("seed user");
    user
}

pub(super) fn submission(employee: &User) -> SubmitRequest {
    SubmitRequest {
        employee_id: employee.id.clone(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 1, 5),
        reason: "trip".to_string(),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryUsers {
    records: Arc<Mutex<HashMap<UserId, User>>>,
}

fn users_most_recent_first(mut users: Vec<User>) -> Vec<User> {
    users.sort_by(|a, b| (&b.created_at, &b.id).cmp(&(&a.created_at, &a.id)));
    users
}

impl UserRepository for MemoryUsers {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&user.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn update(&self, user: User) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&user.id) {
            guard.insert(user.id.clone(), user);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().find(|user| user.email == email).cloned())
    }

    fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(users_most_recent_first(guard.values().cloned().collect()))
    }

    fn delete(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.remove(id))
    }

    fn direct_reports(&self, manager_id: &UserId) -> Result<Vec<User>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(users_most_recent_first(
            guard
                .values()
                .filter(|user| user.manager_id.as_ref() == Some(manager_id))
                .cloned()
                .collect(),
        ))
    }

    fn clear_manager(&self, manager_id: &UserId) -> Result<usize, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let mut cleared = 0;
        for user in guard.values_mut() {
            if user.manager_id.as_ref() == Some(manager_id) {
                user.manager_id = None;
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRequests {
    records: Arc<Mutex<HashMap<RequestId, VacationRequest>>>,
}

impl MemoryRequests {
    pub(super) fn all(&self) -> Vec<VacationRequest> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .cloned()
            .collect()
    }
}

fn requests_most_recent_first(mut requests: Vec<VacationRequest>) -> Vec<VacationRequest> {
    requests.sort_by(|a, b| (&b.created_at, &b.id).cmp(&(&a.created_at, &a.id)));
    requests
}

impl VacationRequestRepository for MemoryRequests {
    fn insert(&self, request: VacationRequest) -> Result<VacationRequest, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn update(&self, request: VacationRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&request.id) {
            guard.insert(request.id.clone(), request);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<VacationRequest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_for_employee(
        &self,
        employee_id: &UserId,
    ) -> Result<Vec<VacationRequest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(requests_most_recent_first(
            guard
                .values()
                .filter(|request| &request.employee_id == employee_id)
                .cloned()
                .collect(),
        ))
    }

    fn list_for_employees(
        &self,
        employee_ids: &[UserId],
    ) -> Result<Vec<VacationRequest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(requests_most_recent_first(
            guard
                .values()
                .filter(|request| employee_ids.contains(&request.employee_id))
                .cloned()
                .collect(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct TriggeredEvent {
    pub(super) workflow: String,
    pub(super) subscriber_id: String,
    pub(super) payload: BTreeMap<String, String>,
}

#[derive(Default, Clone)]
pub(super) struct MemoryGateway {
    triggers: Arc<Mutex<Vec<TriggeredEvent>>>,
}

impl MemoryGateway {
    pub(super) fn triggers(&self) -> Vec<TriggeredEvent> {
        self.triggers.lock().expect("gateway mutex poisoned").clone()
    }
}

impl NotificationGateway for MemoryGateway {
    fn register_subscriber(&self, _profile: &SubscriberProfile) -> Result<(), GatewayError> {
        Ok(())
    }

    fn deregister_subscriber(&self, _subscriber_id: &str) -> Result<(), GatewayError> {
        Ok(())
    }

    fn trigger(
        &self,
        workflow: &str,
        subscriber_id: &str,
        payload: BTreeMap<String, String>,
    ) -> Result<(), GatewayError> {
        self.triggers
            .lock()
            .expect("gateway mutex poisoned")
            .push(TriggeredEvent {
                workflow: workflow.to_string(),
                subscriber_id: subscriber_id.to_string(),
                payload,
            });
        Ok(())
    }

    fn feed(&self, subscriber_id: &str, limit: usize) -> Result<serde_json::Value, GatewayError> {
        let guard = self.triggers.lock().expect("gateway mutex poisoned");
        let events: Vec<serde_json::Value> = guard
            .iter()
            .rev()
            .filter(|event| event.subscriber_id == subscriber_id)
            .take(limit)
            .map(|event| {
                serde_json::json!({
                    "workflow": event.workflow,
                    "payload": event.payload,
                })
            })
            .collect();
        Ok(serde_json::json!({ "data": events }))
    }
}

pub(super) struct FailingGateway;

impl NotificationGateway for FailingGateway {
    fn register_subscriber(&self, _profile: &SubscriberProfile) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("gateway offline".to_string()))
    }

    fn deregister_subscriber(&self, _subscriber_id: &str) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("gateway offline".to_string()))
    }

    fn trigger(
        &self,
        _workflow: &str,
        _subscriber_id: &str,
        _payload: BTreeMap<String, String>,
    ) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable("gateway offline".to_string()))
    }

    fn feed(&self, _subscriber_id: &str, _limit: usize) -> Result<serde_json::Value, GatewayError> {
        Err(GatewayError::Unavailable("gateway offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
