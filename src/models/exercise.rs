use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ExerciseActivity, ExerciseIntensity};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity: ExerciseActivity,
    pub duration_minutes: u32,
    pub intensity: Option<ExerciseIntensity>,
    pub notes: Option<String>,
    pub performed_at: NaiveDateTime,
}
