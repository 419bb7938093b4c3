use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::domain::{User, UserId, UserView};
use super::repository::{RepositoryError, UserRepository};
use crate::workflows::notifications::gateway::{NotificationGateway, SubscriberProfile};

/// Service composing the user store and the notification gateway seam.
pub struct DirectoryService<R, G> {
    users: Arc<R>,
    gateway: Arc<G>,
}

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// The subscriber identifier is time-based, matching what the provider sees as
/// the feed/trigger target; the sequence suffix keeps same-millisecond
/// creations distinct.
fn next_user_identity() -> (UserId, String) {
    let seq = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let id = UserId(format!("usr-{seq:06}"));
    let subscriber_id = format!("user-{}-{seq:06}", Utc::now().timestamp_millis());
    (id, subscriber_id)
}

impl<R, G> DirectoryService<R, G>
where
    R: UserRepository + 'static,
    G: NotificationGateway + 'static,
{
    pub fn new(users: Arc<R>, gateway: Arc<G>) -> Self {
        Self { users, gateway }
    }

    /// All users, most-recently-created first, managers resolved for display.
    pub fn list(&self) -> Result<Vec<UserView>, DirectoryError> {
        self.users
            .list()?
            .into_iter()
            .map(|user| self.view(user))
            .collect()
    }

    pub fn get(&self, id: &UserId) -> Result<UserView, DirectoryError> {
        let user = self.users.fetch(id)?.ok_or(DirectoryError::UserNotFound)?;
        self.view(user)
    }

    /// Create a user and register them with the notification provider.
    ///
    /// The initial manager reference is stored as given; only assign-manager
    /// validates the target. Provider registration is best-effort and never
    /// fails the create.
    pub fn create(
        &self,
        name: String,
        email: String,
        manager_id: Option<UserId>,
    ) -> Result<UserView, DirectoryError> {
        if self.users.fetch_by_email(&email)?.is_some() {
            return Err(DirectoryError::DuplicateEmail);
        }

        let (id, subscriber_id) = next_user_identity();
        let user = User {
            id,
            name,
            email,
            subscriber_id,
            manager_id,
            created_at: Utc::now(),
        };
        let stored = self.users.insert(user)?;

        let profile = SubscriberProfile::from_directory(
            stored.subscriber_id.clone(),
            &stored.name,
            stored.email.clone(),
        );
        if let Err(err) = self.gateway.register_subscriber(&profile) {
            warn!(
                subscriber_id = %stored.subscriber_id,
                error = %err,
                "subscriber registration failed"
            );
        }

        self.view(stored)
    }

    /// Point a user at a manager, or clear the link with `None`.
    pub fn assign_manager(
        &self,
        id: &UserId,
        manager_id: Option<UserId>,
    ) -> Result<UserView, DirectoryError> {
        let mut user = self.users.fetch(id)?.ok_or(DirectoryError::UserNotFound)?;

        if let Some(manager_id) = &manager_id {
            if self.users.fetch(manager_id)?.is_none() {
                return Err(DirectoryError::ManagerNotFound);
            }
            if manager_id == id {
                return Err(DirectoryError::SelfManager);
            }
        }

        user.manager_id = manager_id;
        self.users.update(user.clone())?;
        self.view(user)
    }

    /// Remove a user, clearing the manager link on every direct report and
    /// best-effort deregistering the subscriber.
    pub fn delete(&self, id: &UserId) -> Result<(), DirectoryError> {
        let removed = self.users.delete(id)?.ok_or(DirectoryError::UserNotFound)?;

        self.users.clear_manager(id)?;

        if let Err(err) = self.gateway.deregister_subscriber(&removed.subscriber_id) {
            warn!(
                subscriber_id = %removed.subscriber_id,
                error = %err,
                "subscriber deregistration failed"
            );
        }

        Ok(())
    }

    fn view(&self, user: User) -> Result<UserView, DirectoryError> {
        // A dangling manager reference resolves to no summary rather than an
        // error: create never validated it and delete may have cleared it.
        let manager = match &user.manager_id {
            Some(manager_id) => self.users.fetch(manager_id)?.map(|m| m.summary()),
            None => None,
        };

        Ok(UserView {
            id: user.id,
            name: user.name,
            email: user.email,
            subscriber_id: user.subscriber_id,
            manager,
            created_at: user.created_at,
        })
    }
}

/// Error raised by the directory service. Messages are the exact strings the
/// HTTP surface exposes.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("User not found")]
    UserNotFound,
    #[error("Manager not found")]
    ManagerNotFound,
    #[error("User with this email already exists")]
    DuplicateEmail,
    #[error("User cannot be their own manager")]
    SelfManager,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
