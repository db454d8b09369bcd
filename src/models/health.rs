use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MetricType;

/// A medication owned by a user. Deactivated (`active = false`) rather
/// than deleted, so historical logs keep their parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// One scheduled dose. Created by the external dose scheduler; mutated
/// once when the dose is marked taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationLog {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub scheduled_time: NaiveDateTime,
    pub taken: bool,
    pub taken_at: Option<NaiveDateTime>,
}

/// A single health measurement. Append-only log; the owner may update or
/// delete an entry but revisions are not versioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetric {
    pub id: Uuid,
    pub user_id: Uuid,
    pub metric_type: MetricType,
    pub value: f64,
    /// Diastolic reading for blood_pressure; None for all other types.
    pub value_secondary: Option<f64>,
    pub unit: String,
    pub notes: Option<String>,
    pub recorded_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}
