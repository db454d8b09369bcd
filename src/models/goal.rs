use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::GoalStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: GoalStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl Goal {
    /// Progress toward the target, clamped to [0, 100].
    pub fn progress_percent(&self) -> u32 {
        if self.target_value <= 0.0 {
            return 0;
        }
        let pct = (self.current_value / self.target_value * 100.0).round();
        pct.clamp(0.0, 100.0) as u32
    }
}
