use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use leave_hub::workflows::directory::{RepositoryError, User, UserId, UserRepository};
use leave_hub::workflows::notifications::{GatewayError, NotificationGateway, SubscriberProfile};
use leave_hub::workflows::vacation::{RequestId, VacationRequest, VacationRequestRepository};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryUserRepository {
    records: Arc<Mutex<HashMap<UserId, User>>>,
}

fn users_most_recent_first(mut users: Vec<User>) -> Vec<User> {
    users.sort_by(|a, b| (&b.created_at, &b.id).cmp(&(&a.created_at, &a.id)));
    users
}

impl UserRepository for InMemoryUserRepository {
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
pub(crate) struct InMemoryVacationRepository {
    records: Arc<Mutex<HashMap<RequestId, VacationRequest>>>,
}

fn requests_most_recent_first(mut requests: Vec<VacationRequest>) -> Vec<VacationRequest> {
    requests.sort_by(|a, b| (&b.created_at, &b.id).cmp(&(&a.created_at, &a.id)));
    requests
}

impl VacationRequestRepository for InMemoryVacationRepository {
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

/// Stand-in for the hosted notification provider: records registrations and
/// keeps a per-subscriber feed of triggered events, newest first, so the feed
/// proxy endpoint has real content during demos.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationGateway {
    subscribers: Arc<Mutex<HashMap<String, SubscriberProfile>>>,
    feeds: Arc<Mutex<HashMap<String, Vec<serde_json::Value>>>>,
}

impl NotificationGateway for InMemoryNotificationGateway {
    fn register_subscriber(&self, profile: &SubscriberProfile) -> Result<(), GatewayError> {
        let mut guard = self.subscribers.lock().expect("gateway mutex poisoned");
        guard.insert(profile.subscriber_id.clone(), profile.clone());
        Ok(())
    }

    fn deregister_subscriber(&self, subscriber_id: &str) -> Result<(), GatewayError> {
        let mut guard = self.subscribers.lock().expect("gateway mutex poisoned");
        guard.remove(subscriber_id);
        self.feeds
            .lock()
            .expect("gateway mutex poisoned")
            .remove(subscriber_id);
        Ok(())
    }

    fn trigger(
        &self,
        workflow: &str,
        subscriber_id: &str,
        payload: BTreeMap<String, String>,
    ) -> Result<(), GatewayError> {
        let mut guard = self.feeds.lock().expect("gateway mutex poisoned");
        let feed = guard.entry(subscriber_id.to_string()).or_default();
        feed.insert(
            0,
            serde_json::json!({
                "workflow": workflow,
                "payload": payload,
            }),
        );
        Ok(())
    }

    fn feed(&self, subscriber_id: &str, limit: usize) -> Result<serde_json::Value, GatewayError> {
        let guard = self.feeds.lock().expect("gateway mutex poisoned");
        let events: Vec<serde_json::Value> = guard
            .get(subscriber_id)
            .map(|feed| feed.iter().take(limit).cloned().collect())
            .unwrap_or_default();
        Ok(serde_json::json!({ "data": events }))
    }
}
