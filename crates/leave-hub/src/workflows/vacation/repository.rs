use super::domain::{RequestId, VacationRequest};
use crate::workflows::directory::domain::UserId;
use crate::workflows::directory::repository::RepositoryError;

/// Storage abstraction for vacation requests.
///
/// Both listing methods return records most-recently-created first;
/// `list_for_employees` is the manager view over a set of direct reports.
pub trait VacationRequestRepository: Send + Sync {
    fn insert(&self, request: VacationRequest) -> Result<VacationRequest, RepositoryError>;
    fn update(&self, request: VacationRequest) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &RequestId) -> Result<Option<VacationRequest>, RepositoryError>;
    fn list_for_employee(&self, employee_id: &UserId)
        -> Result<Vec<VacationRequest>, RepositoryError>;
    fn list_for_employees(
        &self,
        employee_ids: &[UserId],
    ) -> Result<Vec<VacationRequest>, RepositoryError>;
}
