//! Seam to the external notification provider.
//!
//! The provider owns delivery, retries, and feed storage; the service only
//! registers subscribers and fires named workflow triggers. Every trigger from
//! the directory and vacation workflows is best-effort: failures are logged and
//! swallowed so the primary operation still succeeds. The explicit test
//! endpoint is the one place a gateway failure surfaces to the caller.

pub mod gateway;
pub mod router;
pub mod service;

pub use gateway::{
    GatewayError, NotificationGateway, SubscriberProfile, APPROVED_WORKFLOW, SUBMITTED_WORKFLOW,
    REJECTED_WORKFLOW, TEST_WORKFLOW,
};
pub use router::notifications_router;
pub use service::{NotificationError, NotificationService};
