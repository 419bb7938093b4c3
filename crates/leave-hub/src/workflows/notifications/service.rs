use std::collections::BTreeMap;
use std::sync::Arc;

use super::gateway::{GatewayError, NotificationGateway, TEST_WORKFLOW};
use crate::workflows::directory::domain::UserId;
use crate::workflows::directory::repository::{RepositoryError, UserRepository};

/// Page size used when proxying the provider feed.
const FEED_LIMIT: usize = 20;

/// Connectivity checks and feed proxying against the provider.
///
/// Unlike the workflow triggers, `send_test` exists to surface gateway
/// failures, so they propagate instead of being swallowed.
pub struct NotificationService<R, G> {
    users: Arc<R>,
    gateway: Arc<G>,
}

impl<R, G> NotificationService<R, G>
where
    R: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    pub fn new(users: Arc<R>, gateway: Arc<G>) -> Self {
        Self { users, gateway }
    }

    pub fn send_test(
        &self,
        user_id: &UserId,
        message: Option<String>,
    ) -> Result<(), NotificationError> {
        let user = self
            .users
            .fetch(user_id)?
            .ok_or(NotificationError::UserNotFound)?;

        let mut payload = BTreeMap::new();
        payload.insert("orderId".to_string(), "TEST-001".to_string());
        payload.insert("status".to_string(), "Test Notification".to_string());
        payload.insert(
            "message".to_string(),
            message.unwrap_or_else(|| "This is a test notification!".to_string()),
        );

        self.gateway
            .trigger(TEST_WORKFLOW, &user.subscriber_id, payload)?;
        Ok(())
    }

    pub fn feed(&self, subscriber_id: &str) -> Result<serde_json::Value, NotificationError> {
        Ok(self.gateway.feed(subscriber_id, FEED_LIMIT)?)
    }
}

/// Error raised by the notification endpoints.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
