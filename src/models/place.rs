use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved destination for the navigation screen. Directions come from
/// the external maps API; only the place itself is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: NaiveDateTime,
}
