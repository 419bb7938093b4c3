use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for directory users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Directory record for an employee or manager.
///
/// `manager_id` is a weak back-reference: it stores a key, never an owning
/// pointer, and is resolved by lookup at read time. Deleting a manager clears
/// the reference on dependents instead of cascading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub subscriber_id: String,
    pub manager_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Role is structural, not stored: a user with a manager assigned acts as
    /// an employee; a user without one is treated as a manager. A top-of-
    /// hierarchy account is indistinguishable from any other manager-less one.
    pub fn is_employee(&self) -> bool {
        self.manager_id.is_some()
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Reduced projection of a user embedded in other entities' responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// HTTP shape of a user with the manager reference resolved for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub subscriber_id: String,
    pub manager: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}
