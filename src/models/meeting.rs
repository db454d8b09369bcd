use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled video meeting. Silverline stores the room name only;
/// the video-room provider that serves it is an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: Uuid,
    pub group_id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    pub room_name: String,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: u32,
    pub created_at: NaiveDateTime,
}
