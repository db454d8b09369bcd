//! Request-payload validators.
//!
//! Every validator is a pure predicate: it returns `Ok(())` or the full
//! list of human-readable problems, so a form can show all of them at
//! once. Value-range tables are keyed by metric type and shared with
//! nothing — this module is the single source of truth for them.

use chrono::{Duration, NaiveDateTime, Utc};

use crate::models::enums::MetricType;

/// Inclusive plausible range for a metric's primary value.
pub fn metric_value_range(metric_type: MetricType) -> (f64, f64) {
    match metric_type {
        MetricType::Weight => (20.0, 300.0),
        MetricType::Height => (50.0, 250.0),
        MetricType::BloodPressure => (50.0, 250.0), // systolic
        MetricType::HeartRate => (30.0, 220.0),
        MetricType::BloodSugar => (20.0, 600.0),
        MetricType::Temperature => (30.0, 45.0),
        MetricType::OxygenSaturation => (50.0, 100.0),
        MetricType::Steps => (0.0, 100_000.0),
        MetricType::SleepHours => (0.0, 24.0),
        MetricType::WaterIntake => (0.0, 10_000.0),
        MetricType::Cholesterol => (50.0, 500.0),
    }
}

/// Inclusive range for the diastolic reading of a blood-pressure entry.
pub const DIASTOLIC_RANGE: (f64, f64) = (30.0, 150.0);

/// How far back a metric may be dated.
pub const MAX_METRIC_AGE_DAYS: i64 = 365;

/// Validate a health-metric submission (create or update).
pub fn validate_health_metric(
    metric_type: MetricType,
    value: f64,
    value_secondary: Option<f64>,
    recorded_at: Option<NaiveDateTime>,
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let (lo, hi) = metric_value_range(metric_type);
    if !value.is_finite() || value < lo || value > hi {
        errors.push(format!(
            "{} value must be between {lo} and {hi} {}",
            metric_type.as_str(),
            metric_type.default_unit()
        ));
    }

    if metric_type.has_secondary_value() {
        match value_secondary {
            None => errors.push("blood_pressure requires a diastolic value".to_string()),
            Some(diastolic) => {
                let (dlo, dhi) = DIASTOLIC_RANGE;
                if !diastolic.is_finite() || diastolic < dlo || diastolic > dhi {
                    errors.push(format!("diastolic must be between {dlo} and {dhi} mmHg"));
                }
                // systolic strictly exceeds diastolic, always
                if diastolic >= value {
                    errors.push("systolic must be greater than diastolic".to_string());
                }
            }
        }
    } else if value_secondary.is_some() {
        errors.push(format!(
            "{} does not take a secondary value",
            metric_type.as_str()
        ));
    }

    if let Some(recorded) = recorded_at {
        let now = Utc::now().naive_utc();
        if recorded > now {
            errors.push("recordedAt must not be in the future".to_string());
        }
        if recorded < now - Duration::days(MAX_METRIC_AGE_DAYS) {
            errors.push("recordedAt must not be older than 1 year".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Ratings are whole stars, 1 through 5.
pub fn validate_rating(rating: u8) -> Result<(), Vec<String>> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(vec!["rating must be between 1 and 5".to_string()])
    }
}

/// Exercise duration in minutes; a day has 1440 of them.
pub fn validate_exercise_duration(duration_minutes: u32) -> Result<(), Vec<String>> {
    if (1..=1440).contains(&duration_minutes) {
        Ok(())
    } else {
        Err(vec!["durationMinutes must be between 1 and 1440".to_string()])
    }
}

/// Goal targets are strictly positive.
pub fn validate_goal_target(target_value: f64) -> Result<(), Vec<String>> {
    if target_value.is_finite() && target_value > 0.0 {
        Ok(())
    } else {
        Err(vec!["targetValue must be greater than 0".to_string()])
    }
}

/// Coordinates of a saved place.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if !(-90.0..=90.0).contains(&latitude) {
        errors.push("latitude must be between -90 and 90".to_string());
    }
    if !(-180.0..=180.0).contains(&longitude) {
        errors.push("longitude must be between -180 and 180".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Required free-text field: present and not just whitespace.
pub fn validate_required(field: &str, value: &str) -> Result<(), Vec<String>> {
    if value.trim().is_empty() {
        Err(vec![format!("{field} is required")])
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_range_enforced() {
        assert!(validate_health_metric(MetricType::Weight, 82.5, None, None).is_ok());
        assert!(validate_health_metric(MetricType::Weight, 19.9, None, None).is_err());
        assert!(validate_health_metric(MetricType::Weight, 301.0, None, None).is_err());
    }

    #[test]
    fn heart_rate_range_enforced() {
        assert!(validate_health_metric(MetricType::HeartRate, 72.0, None, None).is_ok());
        assert!(validate_health_metric(MetricType::HeartRate, 29.0, None, None).is_err());
        assert!(validate_health_metric(MetricType::HeartRate, 221.0, None, None).is_err());
    }

    #[test]
    fn systolic_must_exceed_diastolic() {
        // systolic 120 / diastolic 130 is rejected outright
        let err =
            validate_health_metric(MetricType::BloodPressure, 120.0, Some(130.0), None).unwrap_err();
        assert!(err.iter().any(|e| e.contains("greater than diastolic")));

        assert!(validate_health_metric(MetricType::BloodPressure, 120.0, Some(80.0), None).is_ok());
    }

    #[test]
    fn equal_systolic_diastolic_rejected() {
        let err =
            validate_health_metric(MetricType::BloodPressure, 110.0, Some(110.0), None).unwrap_err();
        assert!(err.iter().any(|e| e.contains("greater than diastolic")));
    }

    #[test]
    fn blood_pressure_requires_diastolic() {
        let err = validate_health_metric(MetricType::BloodPressure, 120.0, None, None).unwrap_err();
        assert!(err.iter().any(|e| e.contains("diastolic")));
    }

    #[test]
    fn secondary_value_rejected_for_scalar_metrics() {
        assert!(validate_health_metric(MetricType::Weight, 80.0, Some(1.0), None).is_err());
    }

    #[test]
    fn future_recording_rejected() {
        let future = Utc::now().naive_utc() + Duration::days(2);
        let err = validate_health_metric(MetricType::Weight, 80.0, None, Some(future)).unwrap_err();
        assert!(err.iter().any(|e| e.contains("future")));
    }

    #[test]
    fn year_old_recording_rejected() {
        let old = Utc::now().naive_utc() - Duration::days(400);
        let err = validate_health_metric(MetricType::Weight, 80.0, None, Some(old)).unwrap_err();
        assert!(err.iter().any(|e| e.contains("1 year")));
    }

    #[test]
    fn recent_recording_accepted() {
        let recent = Utc::now().naive_utc() - Duration::days(3);
        assert!(validate_health_metric(MetricType::Weight, 80.0, None, Some(recent)).is_ok());
    }

    #[test]
    fn multiple_problems_reported_together() {
        let future = Utc::now().naive_utc() + Duration::days(1);
        let err =
            validate_health_metric(MetricType::HeartRate, 500.0, None, Some(future)).unwrap_err();
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn exercise_duration_bounds() {
        assert!(validate_exercise_duration(30).is_ok());
        assert!(validate_exercise_duration(0).is_err());
        assert!(validate_exercise_duration(1441).is_err());
    }

    #[test]
    fn coordinate_bounds() {
        assert!(validate_coordinates(51.5, -0.12).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, 181.0).is_err());
        assert_eq!(validate_coordinates(95.0, 200.0).unwrap_err().len(), 2);
    }

    #[test]
    fn required_field_rejects_blank() {
        assert!(validate_required("title", "Coffee morning").is_ok());
        assert!(validate_required("title", "   ").is_err());
    }

    #[test]
    fn every_metric_type_has_a_range() {
        for mt in MetricType::ALL {
            let (lo, hi) = metric_value_range(mt);
            assert!(lo < hi, "{:?} has inverted range", mt);
        }
    }
}
