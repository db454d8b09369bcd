//! Health dashboard & report — aggregate queries and assembly.
//!
//! Pulls medication-log and health-metric aggregates for one user and
//! feeds them through the analytics layer. The wire shapes here are the
//! compatibility contract for the browser frontend, so field names are
//! exact.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::compliance::{self, ComplianceLevel, ComplianceSummary};
use crate::analytics::trend::{longest_streak, metric_trend, DayAdherence, MetricTrend};
use crate::analytics::{blood_pressure_alert, compliance_alert, HealthAlert};
use crate::db::repository::{self, recorded_metric_types};
use crate::db::DatabaseError;

/// Weekly trends always look at the trailing week, regardless of the
/// dashboard window.
const TREND_WINDOW_DAYS: i64 = 7;

/// How many missed doses the dashboard surfaces.
const RECENT_MISSED_LIMIT: u32 = 10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_doses: u32,
    pub taken_doses: u32,
    pub overall_compliance: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAdherenceDay {
    pub date: NaiveDate,
    pub scheduled_count: u32,
    pub taken_count: u32,
    pub compliance_rate: u32,
    pub perfect_day: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationAdherence {
    pub medication_id: Uuid,
    pub name: String,
    pub taken_count: u32,
    pub scheduled_count: u32,
    pub compliance_rate: u32,
    pub compliance_level: ComplianceLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedDose {
    pub log_id: Uuid,
    pub medication_id: Uuid,
    pub name: String,
    pub scheduled_time: NaiveDateTime,
}

/// The `data` payload of `GET /api/health-dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDashboard {
    pub overall_stats: OverallStats,
    pub daily_adherence: Vec<DailyAdherenceDay>,
    pub medication_adherence: Vec<MedicationAdherence>,
    pub recent_missed: Vec<MissedDose>,
    pub weekly_trends: Vec<MetricTrend>,
}

/// The `data` payload of `GET /api/health-report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub compliance: ComplianceSummary,
    pub longest_streak: u32,
    pub trends: Vec<MetricTrend>,
    pub alerts: Vec<HealthAlert>,
}

// ---------------------------------------------------------------------------
// Aggregate queries
// ---------------------------------------------------------------------------

/// Total/taken dose counts across all of a user's medications.
pub fn overall_dose_counts(
    conn: &Connection,
    user_id: &Uuid,
    since: NaiveDateTime,
) -> Result<(u32, u32), DatabaseError> {
    let counts: (u32, u32) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(ml.taken), 0)
         FROM medication_logs ml
         JOIN medications m ON ml.medication_id = m.id
         WHERE m.user_id = ?1 AND ml.scheduled_time >= ?2",
        params![user_id.to_string(), repository::fmt_datetime(since)],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(counts)
}

/// Per-medication adherence over the window. Active medications with no
/// scheduled doses still appear — vacuously compliant at 100.
pub fn medication_adherence(
    conn: &Connection,
    user_id: &Uuid,
    since: NaiveDateTime,
) -> Result<Vec<MedicationAdherence>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT m.id, m.name,
                COALESCE(SUM(CASE WHEN ml.scheduled_time >= ?2 THEN ml.taken END), 0),
                COUNT(CASE WHEN ml.scheduled_time >= ?2 THEN ml.id END)
         FROM medications m
         LEFT JOIN medication_logs ml ON ml.medication_id = m.id
         WHERE m.user_id = ?1 AND m.active = 1
         GROUP BY m.id, m.name
         ORDER BY m.name",
    )?;

    let rows = stmt.query_map(
        params![user_id.to_string(), repository::fmt_datetime(since)],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u32>(3)?,
            ))
        },
    )?;

    let mut adherence = Vec::new();
    for row in rows {
        let (id, name, taken_count, scheduled_count) = row?;
        let rate = compliance::compliance_rate(taken_count, scheduled_count);
        adherence.push(MedicationAdherence {
            medication_id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            name,
            taken_count,
            scheduled_count,
            compliance_rate: rate,
            compliance_level: compliance::classify(rate),
        });
    }
    Ok(adherence)
}

/// One entry per calendar day in the window, oldest first. Days without
/// scheduled doses are present with zero counts (and count as perfect).
pub fn daily_adherence(
    conn: &Connection,
    user_id: &Uuid,
    days: u32,
) -> Result<Vec<DailyAdherenceDay>, DatabaseError> {
    let today = Utc::now().date_naive();
    let start = today - Duration::days(i64::from(days) - 1);
    let since = start.and_hms_opt(0, 0, 0).expect("midnight exists");

    let mut stmt = conn.prepare(
        "SELECT date(ml.scheduled_time), COUNT(*), COALESCE(SUM(ml.taken), 0)
         FROM medication_logs ml
         JOIN medications m ON ml.medication_id = m.id
         WHERE m.user_id = ?1 AND ml.scheduled_time >= ?2
         GROUP BY date(ml.scheduled_time)",
    )?;

    let rows = stmt.query_map(
        params![user_id.to_string(), repository::fmt_datetime(since)],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
            ))
        },
    )?;

    let mut by_date: HashMap<NaiveDate, (u32, u32)> = HashMap::new();
    for row in rows {
        let (date, scheduled, taken) = row?;
        if let Ok(parsed) = NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
            by_date.insert(parsed, (scheduled, taken));
        }
    }

    let mut daily = Vec::with_capacity(days as usize);
    let mut date = start;
    while date <= today {
        let (scheduled, taken) = by_date.get(&date).copied().unwrap_or((0, 0));
        let rate = compliance::compliance_rate(taken, scheduled);
        daily.push(DailyAdherenceDay {
            date,
            scheduled_count: scheduled,
            taken_count: taken,
            compliance_rate: rate,
            perfect_day: taken >= scheduled,
        });
        date += Duration::days(1);
    }
    Ok(daily)
}

/// Most recent missed doses (scheduled in the past, never taken).
pub fn recent_missed(
    conn: &Connection,
    user_id: &Uuid,
    limit: u32,
) -> Result<Vec<MissedDose>, DatabaseError> {
    let now = repository::fmt_datetime(Utc::now().naive_utc());
    let mut stmt = conn.prepare(
        "SELECT ml.id, m.id, m.name, ml.scheduled_time
         FROM medication_logs ml
         JOIN medications m ON ml.medication_id = m.id
         WHERE m.user_id = ?1 AND ml.taken = 0 AND ml.scheduled_time <= ?2
         ORDER BY ml.scheduled_time DESC
         LIMIT ?3",
    )?;

    let rows = stmt.query_map(params![user_id.to_string(), now, limit], |row| {
        Ok(MissedDose {
            log_id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            medication_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
            name: row.get(2)?,
            scheduled_time: repository::parse_datetime(&row.get::<_, String>(3)?),
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Trend summaries for every metric type recorded in the trailing week.
pub fn weekly_trends(conn: &Connection, user_id: &Uuid) -> Result<Vec<MetricTrend>, DatabaseError> {
    let since = Utc::now().naive_utc() - Duration::days(TREND_WINDOW_DAYS);
    let mut trends = Vec::new();
    for metric_type in recorded_metric_types(conn, user_id, since)? {
        let series = repository::metric_value_series(conn, user_id, metric_type, since)?;
        trends.push(metric_trend(metric_type, &series));
    }
    Ok(trends)
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Single fetch behind `GET /api/health-dashboard`.
pub fn build_dashboard(
    conn: &Connection,
    user_id: &Uuid,
    days: u32,
) -> Result<HealthDashboard, DatabaseError> {
    let since = Utc::now().naive_utc() - Duration::days(i64::from(days));

    let (total_doses, taken_doses) = overall_dose_counts(conn, user_id, since)?;
    let overall_compliance = compliance::compliance_rate(taken_doses, total_doses);

    Ok(HealthDashboard {
        overall_stats: OverallStats {
            total_doses,
            taken_doses,
            overall_compliance,
        },
        daily_adherence: daily_adherence(conn, user_id, days)?,
        medication_adherence: medication_adherence(conn, user_id, since)?,
        recent_missed: recent_missed(conn, user_id, RECENT_MISSED_LIMIT)?,
        weekly_trends: weekly_trends(conn, user_id)?,
    })
}

/// Single fetch behind `GET /api/health-report`: compliance summary,
/// streak, trends, and any alerts the numbers warrant.
pub fn build_health_report(
    conn: &Connection,
    user_id: &Uuid,
    days: u32,
) -> Result<HealthReport, DatabaseError> {
    let since = Utc::now().naive_utc() - Duration::days(i64::from(days));

    let (total_doses, taken_doses) = overall_dose_counts(conn, user_id, since)?;
    let summary = ComplianceSummary::from_counts(taken_doses, total_doses);

    let day_series: Vec<DayAdherence> = daily_adherence(conn, user_id, days)?
        .into_iter()
        .map(|d| DayAdherence {
            date: d.date,
            scheduled: d.scheduled_count,
            taken: d.taken_count,
        })
        .collect();

    let mut alerts = Vec::new();
    if let Some(alert) = compliance_alert(summary.compliance_rate) {
        alerts.push(alert);
    }
    if let Some((systolic, diastolic)) = repository::blood_pressure_averages(conn, user_id, since)? {
        if let Some(alert) = blood_pressure_alert(systolic, diastolic) {
            alerts.push(alert);
        }
    }

    Ok(HealthReport {
        compliance: summary,
        longest_streak: longest_streak(&day_series),
        trends: weekly_trends(conn, user_id)?,
        alerts,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AlertSeverity;
    use crate::db::repository::test_support::*;
    use crate::models::enums::MetricType;
    use crate::models::HealthMetric;

    fn record_metric(
        conn: &Connection,
        user_id: Uuid,
        metric_type: MetricType,
        value: f64,
        secondary: Option<f64>,
        days_ago: i64,
    ) {
        let when = Utc::now().naive_utc() - Duration::days(days_ago);
        repository::insert_health_metric(
            conn,
            &HealthMetric {
                id: Uuid::new_v4(),
                user_id,
                metric_type,
                value,
                value_secondary: secondary,
                unit: metric_type.default_unit().to_string(),
                notes: None,
                recorded_at: when,
                created_at: when,
            },
        )
        .unwrap();
    }

    #[test]
    fn dashboard_empty_user_is_vacuously_compliant() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");

        let dashboard = build_dashboard(&conn, &ada, 7).unwrap();
        assert_eq!(dashboard.overall_stats.total_doses, 0);
        assert_eq!(dashboard.overall_stats.overall_compliance, 100);
        assert_eq!(dashboard.daily_adherence.len(), 7);
        assert!(dashboard.daily_adherence.iter().all(|d| d.perfect_day));
        assert!(dashboard.medication_adherence.is_empty());
        assert!(dashboard.recent_missed.is_empty());
    }

    #[test]
    fn nine_of_ten_doses_is_ninety_percent_high() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let med_id = make_medication(&conn, &ada, "Ramipril");
        for day in 0..5 {
            make_log(&conn, &med_id, day, 8, true);
            // one evening dose missed on the oldest day
            make_log(&conn, &med_id, day, 20, day != 4);
        }

        let dashboard = build_dashboard(&conn, &ada, 7).unwrap();
        assert_eq!(dashboard.overall_stats.total_doses, 10);
        assert_eq!(dashboard.overall_stats.taken_doses, 9);
        assert_eq!(dashboard.overall_stats.overall_compliance, 90);

        let med = &dashboard.medication_adherence[0];
        assert_eq!(med.name, "Ramipril");
        assert_eq!(med.scheduled_count, 10);
        assert_eq!(med.taken_count, 9);
        assert_eq!(med.compliance_rate, 90);
        assert_eq!(med.compliance_level, ComplianceLevel::High);

        assert_eq!(dashboard.recent_missed.len(), 1);
        assert_eq!(dashboard.recent_missed[0].name, "Ramipril");
    }

    #[test]
    fn medication_without_logs_reads_one_hundred() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        make_medication(&conn, &ada, "Vitamin D");

        let dashboard = build_dashboard(&conn, &ada, 7).unwrap();
        let med = &dashboard.medication_adherence[0];
        assert_eq!(med.scheduled_count, 0);
        assert_eq!(med.compliance_rate, 100);
        assert_eq!(med.compliance_level, ComplianceLevel::High);
    }

    #[test]
    fn daily_adherence_marks_missed_days() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let med_id = make_medication(&conn, &ada, "Ramipril");
        make_log(&conn, &med_id, 1, 8, true);
        make_log(&conn, &med_id, 2, 8, false);

        let daily = daily_adherence(&conn, &ada, 7).unwrap();
        assert_eq!(daily.len(), 7);

        let missed_day = daily.iter().find(|d| d.scheduled_count == 1 && !d.perfect_day);
        assert!(missed_day.is_some());
        assert_eq!(missed_day.unwrap().compliance_rate, 0);
    }

    #[test]
    fn report_streak_counts_trailing_perfect_days() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let med_id = make_medication(&conn, &ada, "Ramipril");
        // missed 3 days ago, taken since; with empty days the last 3 days
        // are all perfect
        make_log(&conn, &med_id, 3, 8, false);
        make_log(&conn, &med_id, 2, 8, true);
        make_log(&conn, &med_id, 1, 8, true);
        make_log(&conn, &med_id, 0, 8, true);

        let report = build_health_report(&conn, &ada, 7).unwrap();
        // 7-day window: 3 leading empty (perfect) days, one missed, 3 perfect
        assert_eq!(report.longest_streak, 3);
    }

    #[test]
    fn report_sixty_percent_raises_critical_alert() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let med_id = make_medication(&conn, &ada, "Ramipril");
        for dose in 0u32..10 {
            make_log(&conn, &med_id, i64::from(dose % 5), 8 + (dose / 5) * 12, dose < 6);
        }

        let report = build_health_report(&conn, &ada, 7).unwrap();
        assert_eq!(report.compliance.compliance_rate, 60);
        assert_eq!(report.compliance.compliance_level, ComplianceLevel::Medium);
        // 60 < 70: the alert bracket is critical even though the level is
        // medium
        let alert = report
            .alerts
            .iter()
            .find(|a| a.alert_type == "compliance")
            .unwrap();
        assert_eq!(alert.severity, AlertSeverity::Critical);
    }

    #[test]
    fn report_full_compliance_raises_nothing() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let med_id = make_medication(&conn, &ada, "Ramipril");
        for day in 0..5 {
            make_log(&conn, &med_id, day, 8, true);
        }

        let report = build_health_report(&conn, &ada, 7).unwrap();
        assert_eq!(report.compliance.compliance_rate, 100);
        assert!(report.alerts.is_empty());
    }

    #[test]
    fn report_flags_high_blood_pressure() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        record_metric(&conn, ada, MetricType::BloodPressure, 155.0, Some(95.0), 1);
        record_metric(&conn, ada, MetricType::BloodPressure, 150.0, Some(92.0), 2);

        let report = build_health_report(&conn, &ada, 7).unwrap();
        let bp = report
            .alerts
            .iter()
            .find(|a| a.alert_type == "blood_pressure")
            .unwrap();
        assert_eq!(bp.severity, AlertSeverity::High);
    }

    #[test]
    fn weekly_trends_cover_recorded_types_only() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        for day in 0..6 {
            record_metric(&conn, ada, MetricType::Weight, 84.0 - day as f64, None, day);
        }

        let trends = weekly_trends(&conn, &ada).unwrap();
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].metric_type, MetricType::Weight);
    }

    #[test]
    fn dashboard_is_idempotent_over_same_data() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let med_id = make_medication(&conn, &ada, "Ramipril");
        make_log(&conn, &med_id, 1, 8, true);
        make_log(&conn, &med_id, 2, 8, false);

        let first = build_dashboard(&conn, &ada, 7).unwrap();
        let second = build_dashboard(&conn, &ada, 7).unwrap();
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn dashboard_serializes_contract_field_names() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let med_id = make_medication(&conn, &ada, "Ramipril");
        make_log(&conn, &med_id, 1, 8, true);

        let json = serde_json::to_value(build_dashboard(&conn, &ada, 7).unwrap()).unwrap();
        assert!(json["overallStats"]["totalDoses"].is_number());
        assert!(json["overallStats"]["takenDoses"].is_number());
        assert!(json["overallStats"]["overallCompliance"].is_number());
        assert!(json["dailyAdherence"].is_array());
        assert!(json["medicationAdherence"].is_array());
        assert!(json["recentMissed"].is_array());
        assert!(json["weeklyTrends"].is_array());

        let med = &json["medicationAdherence"][0];
        for key in ["medicationId", "name", "takenCount", "scheduledCount", "complianceRate", "complianceLevel"] {
            assert!(!med[key].is_null(), "missing {key}");
        }
    }
}
