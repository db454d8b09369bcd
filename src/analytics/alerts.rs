//! Alert-threshold classification.
//!
//! Severity is a pure function of the aggregate numbers; whether anything
//! is sent to emergency contacts is the dispatcher's business.

use serde::{Deserialize, Serialize};

/// Compliance below this is critical — emergency contacts are notified
/// immediately.
pub const ALERT_CRITICAL_BELOW: u32 = 70;
/// Compliance below this (but not critical) notifies contacts.
pub const ALERT_HIGH_BELOW: u32 = 80;
/// Compliance below this (but not high) is advisory only.
pub const ALERT_MEDIUM_BELOW: u32 = 90;

/// Averaged systolic above this raises a blood-pressure alert.
pub const BP_SYSTOLIC_LIMIT: f64 = 140.0;
/// Averaged diastolic above this raises a blood-pressure alert.
pub const BP_DIASTOLIC_LIMIT: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    High,
    Medium,
}

impl AlertSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertSeverity::Critical => "critical",
            AlertSeverity::High => "high",
            AlertSeverity::Medium => "medium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAlert {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: AlertSeverity,
    pub message: String,
    pub recommendation: String,
}

/// Map an aggregate compliance percentage to an alert, or nothing at ≥90.
pub fn compliance_alert(compliance_rate: u32) -> Option<HealthAlert> {
    let severity = if compliance_rate < ALERT_CRITICAL_BELOW {
        AlertSeverity::Critical
    } else if compliance_rate < ALERT_HIGH_BELOW {
        AlertSeverity::High
    } else if compliance_rate < ALERT_MEDIUM_BELOW {
        AlertSeverity::Medium
    } else {
        return None;
    };

    let (message, recommendation) = match severity {
        AlertSeverity::Critical => (
            format!("Medication compliance has dropped to {compliance_rate}%."),
            "Contact the care team now and review the medication schedule together.".to_string(),
        ),
        AlertSeverity::High => (
            format!("Medication compliance is at {compliance_rate}%, below the expected level."),
            "Check in about missed doses and consider dose reminders.".to_string(),
        ),
        AlertSeverity::Medium => (
            format!("Medication compliance is at {compliance_rate}%."),
            "A few doses were missed recently — a gentle reminder may help.".to_string(),
        ),
    };

    Some(HealthAlert {
        alert_type: "compliance".to_string(),
        severity,
        message,
        recommendation,
    })
}

/// Raised when window-averaged blood pressure exceeds either limit.
pub fn blood_pressure_alert(avg_systolic: f64, avg_diastolic: f64) -> Option<HealthAlert> {
    if avg_systolic <= BP_SYSTOLIC_LIMIT && avg_diastolic <= BP_DIASTOLIC_LIMIT {
        return None;
    }
    Some(HealthAlert {
        alert_type: "blood_pressure".to_string(),
        severity: AlertSeverity::High,
        message: format!(
            "Average blood pressure over the period is {:.0}/{:.0} mmHg.",
            avg_systolic, avg_diastolic
        ),
        recommendation: "Share these readings with a doctor or nurse.".to_string(),
    })
}
