//! Alert dispatch contract.
//!
//! Analytics produces alert records; getting them to emergency contacts
//! (SMS, push, whatever the deployment wires up) is a collaborator behind
//! this trait. The default implementation only logs.

use uuid::Uuid;

use super::alerts::HealthAlert;
use crate::models::EmergencyContact;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Notification channel unavailable: {0}")]
    ChannelUnavailable(String),
}

pub trait AlertDispatcher: Send + Sync {
    /// Deliver one alert for a user to their emergency contacts.
    /// Implementations must not retry; failures surface to the caller.
    fn dispatch(
        &self,
        user_id: Uuid,
        contacts: &[EmergencyContact],
        alert: &HealthAlert,
    ) -> Result<(), DispatchError>;
}

/// Logs the dispatch instead of sending anything. Stands in wherever a
/// real notification channel is not configured.
pub struct TracingDispatcher;

impl AlertDispatcher for TracingDispatcher {
    fn dispatch(
        &self,
        user_id: Uuid,
        contacts: &[EmergencyContact],
        alert: &HealthAlert,
    ) -> Result<(), DispatchError> {
        tracing::warn!(
            %user_id,
            severity = alert.severity.as_str(),
            contact_count = contacts.len(),
            "{}",
            alert.message
        );
        Ok(())
    }
}
