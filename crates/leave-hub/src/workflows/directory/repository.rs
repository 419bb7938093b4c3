use super::domain::{User, UserId};

/// Storage abstraction so the directory service can be exercised in isolation.
///
/// `list` and `direct_reports` return records most-recently-created first.
pub trait UserRepository: Send + Sync {
    fn insert(&self, user: User) -> Result<User, RepositoryError>;
    fn update(&self, user: User) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn fetch_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    fn list(&self) -> Result<Vec<User>, RepositoryError>;
    /// Removes the record and returns it, or `None` when absent.
    fn delete(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    fn direct_reports(&self, manager_id: &UserId) -> Result<Vec<User>, RepositoryError>;
    /// Nulls `manager_id` on every user referencing the given manager and
    /// returns how many records were touched.
    fn clear_manager(&self, manager_id: &UserId) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
