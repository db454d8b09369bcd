//! API endpoint handlers.
//!
//! One module per domain screen. Handlers extract caller identity from
//! `UserContext`, validate, call the repository layer, and wrap results
//! in the JSON envelope.

use uuid::Uuid;

use super::error::ApiError;

/// Parse a path-segment UUID, naming the entity in the 400 message.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| ApiError::BadRequest(format!("Invalid {what} ID: {e}")))
}

pub mod announcements;
pub mod chat;
pub mod events;
pub mod exercises;
pub mod goals;
pub mod groups;
pub mod health;
pub mod meetings;
pub mod navigation;
pub mod profile;
pub mod reviews;
