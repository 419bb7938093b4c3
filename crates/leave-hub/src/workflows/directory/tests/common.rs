use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::directory::domain::{User, UserId};
use crate::workflows::directory::repository::{RepositoryError, UserRepository};
use crate::workflows::directory::service::DirectoryService;
use crate::workflows::notifications::gateway::{
    GatewayError, NotificationGateway, SubscriberProfile,
};

pub(super) fn build_service() -> (
    DirectoryService<MemoryUsers, MemoryGateway>,
    Arc<MemoryUsers>,
    Arc<MemoryGateway>,
) {
    let users = Arc::new(MemoryUsers::default());
    let gateway = Arc::new(MemoryGateway::default());
    let service = DirectoryService::new(users.clone(), gateway.clone());
    (service, users, gateway)
}

pub(super) fn failing_service() -> (
    DirectoryService<MemoryUsers, FailingGateway>,
    Arc<MemoryUsers>,
) {
    let users = Arc::new(MemoryUsers::default());
    let service = DirectoryService::new(users.clone(), Arc::new(FailingGateway));
    (service, users)
}

#[derive(Default, Clone)]
pub(super) struct MemoryUsers {
    records: Arc<Mutex<HashMap<UserId, User>>>,
}

fn sorted_most_recent_first(mut users: Vec<User>) -> Vec<User> {
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
        Ok(sorted_most_recent_first(guard.values().cloned().collect()))
    }

    fn delete(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.remove(id))
    }

    fn direct_reports(&self, manager_id: &UserId) -> Result<Vec<User>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(sorted_most_recent_first(
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

/// The directory never fires workflow triggers itself, so this double only
/// records the registration traffic the tests assert on.
#[derive(Default, Clone)]
pub(super) struct MemoryGateway {
    registered: Arc<Mutex<Vec<SubscriberProfile>>>,
    deregistered: Arc<Mutex<Vec<String>>>,
}

impl MemoryGateway {
    pub(super) fn registered(&self) -> Vec<SubscriberProfile> {
        self.registered.lock().expect("gateway mutex poisoned").clone()
    }

    pub(super) fn deregistered(&self) -> Vec<String> {
        self.deregistered
            .lock()
            .expect("gateway mutex poisoned")
            .clone()
    }
}

impl NotificationGateway for MemoryGateway {
    fn register_subscriber(&self, profile: &SubscriberProfile) -> Result<(), GatewayError> {
        self.registered
            .lock()
            .expect("gateway mutex poisoned")
            .push(profile.clone());
        Ok(())
    }

    fn deregister_subscriber(&self, subscriber_id: &str) -> Result<(), GatewayError> {
        self.deregistered
            .lock()
            .expect("gateway mutex poisoned")
            .push(subscriber_id.to_string());
        Ok(())
    }

    fn trigger(
        &self,
        _workflow: &str,
        _subscriber_id: &str,
        _payload: BTreeMap<String, String>,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    fn feed(&self, _subscriber_id: &str, _limit: usize) -> Result<serde_json::Value, GatewayError> {
        Ok(serde_json::json!({ "data": [] }))
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
