//! Employee/manager directory with the weak manager back-reference.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{User, UserId, UserSummary, UserView};
pub use repository::{RepositoryError, UserRepository};
pub use router::directory_router;
pub use service::{DirectoryError, DirectoryService};
