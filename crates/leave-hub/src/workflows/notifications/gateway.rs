use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named workflows configured in the provider.
pub const SUBMITTED_WORKFLOW: &str = "vacation-request-submitted";
pub const APPROVED_WORKFLOW: &str = "vacation-request-approved";
pub const REJECTED_WORKFLOW: &str = "vacation-request-rejected";
/// Ad-hoc workflow used for connectivity checks from the test endpoint.
pub const TEST_WORKFLOW: &str = "order-status-update";

/// Identity handed to the provider when a directory user is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberProfile {
    pub subscriber_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl SubscriberProfile {
    /// Split a directory display name into the first/last pair the provider
    /// expects. Everything after the first whitespace run becomes the last
    /// name; a single-word name carries no last name at all.
    pub fn from_directory(subscriber_id: String, name: &str, email: String) -> Self {
        let mut words = name.split_whitespace();
        let first_name = words.next().unwrap_or_default().to_string();
        let rest = words.collect::<Vec<_>>().join(" ");
        let last_name = if rest.is_empty() { None } else { Some(rest) };

        Self {
            subscriber_id,
            email,
            first_name,
            last_name,
        }
    }
}

/// Provider failure. The provider can fail arbitrarily (network, auth, rate
/// limits); callers in the workflows catch and log, never propagate.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("notification gateway unavailable: {0}")]
    Unavailable(String),
}

/// Contract with the external notification provider.
///
/// Injected into the workflow services so tests can swap in a recording or
/// failing double; never called through a concrete client type.
pub trait NotificationGateway: Send + Sync {
    fn register_subscriber(&self, profile: &SubscriberProfile) -> Result<(), GatewayError>;

    fn deregister_subscriber(&self, subscriber_id: &str) -> Result<(), GatewayError>;

    fn trigger(
        &self,
        workflow: &str,
        subscriber_id: &str,
        payload: BTreeMap<String, String>,
    ) -> Result<(), GatewayError>;

    /// The provider's stored feed for a subscriber, proxied verbatim.
    fn feed(&self, subscriber_id: &str, limit: usize) -> Result<serde_json::Value, GatewayError>;
}
