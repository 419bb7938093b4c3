//! Vacation-request lifecycle: submission, manager review, and the
//! pending → approved/rejected state machine.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{parse_date, RequestId, RequestStatus, RequestView, VacationRequest};
pub use repository::VacationRequestRepository;
pub use router::vacation_router;
pub use service::{SubmitRequest, VacationError, VacationService};
