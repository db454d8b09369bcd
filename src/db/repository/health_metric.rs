use std::str::FromStr;

use chrono::{Duration, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::enums::MetricType;
use crate::models::HealthMetric;

pub fn insert_health_metric(conn: &Connection, metric: &HealthMetric) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO health_metrics (id, user_id, metric_type, value, value_secondary,
         unit, notes, recorded_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            metric.id.to_string(),
            metric.user_id.to_string(),
            metric.metric_type.as_str(),
            metric.value,
            metric.value_secondary,
            metric.unit,
            metric.notes,
            fmt_datetime(metric.recorded_at),
            fmt_datetime(metric.created_at),
        ],
    )?;
    Ok(())
}

fn metric_from_row(row: &rusqlite::Row<'_>) -> Result<(HealthMetric, Option<DatabaseError>), rusqlite::Error> {
    let metric_type_raw: String = row.get(2)?;
    let (metric_type, type_err) = match MetricType::from_str(&metric_type_raw) {
        Ok(mt) => (mt, None),
        Err(e) => (MetricType::Weight, Some(e)),
    };
    Ok((
        HealthMetric {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
            metric_type,
            value: row.get(3)?,
            value_secondary: row.get(4)?,
            unit: row.get(5)?,
            notes: row.get(6)?,
            recorded_at: parse_datetime(&row.get::<_, String>(7)?),
            created_at: parse_datetime(&row.get::<_, String>(8)?),
        },
        type_err,
    ))
}

const METRIC_COLUMNS: &str = "id, user_id, metric_type, value, value_secondary, \
     unit, notes, recorded_at, created_at";

pub fn get_health_metric(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<HealthMetric>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {METRIC_COLUMNS} FROM health_metrics WHERE id = ?1"),
            params![id.to_string()],
            metric_from_row,
        )
        .optional()?;
    match row {
        None => Ok(None),
        Some((_, Some(err))) => Err(err),
        Some((metric, None)) => Ok(Some(metric)),
    }
}

/// A user's metrics within the window, optionally one type only,
/// newest first.
pub fn list_health_metrics(
    conn: &Connection,
    user_id: &Uuid,
    metric_type: Option<MetricType>,
    days: u32,
) -> Result<Vec<HealthMetric>, DatabaseError> {
    let since = fmt_datetime(Utc::now().naive_utc() - Duration::days(i64::from(days)));
    let mut stmt = conn.prepare(&format!(
        "SELECT {METRIC_COLUMNS} FROM health_metrics
         WHERE user_id = ?1 AND recorded_at >= ?2
           AND (?3 IS NULL OR metric_type = ?3)
         ORDER BY recorded_at DESC"
    ))?;

    let rows = stmt.query_map(
        params![
            user_id.to_string(),
            since,
            metric_type.map(|t| t.as_str()),
        ],
        metric_from_row,
    )?;

    let mut metrics = Vec::new();
    for row in rows {
        let (metric, type_err) = row?;
        if let Some(err) = type_err {
            return Err(err);
        }
        metrics.push(metric);
    }
    Ok(metrics)
}

fn owned_metric(conn: &Connection, id: &Uuid, user_id: &Uuid) -> Result<HealthMetric, DatabaseError> {
    let metric = get_health_metric(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "health metric".into(),
        id: id.to_string(),
    })?;
    if metric.user_id != *user_id {
        return Err(DatabaseError::Forbidden("not your metric".into()));
    }
    Ok(metric)
}

/// Owner-only value/notes update. Entries are unversioned.
pub fn update_health_metric(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
    value: f64,
    value_secondary: Option<f64>,
    notes: Option<&str>,
) -> Result<HealthMetric, DatabaseError> {
    owned_metric(conn, id, user_id)?;
    conn.execute(
        "UPDATE health_metrics SET value = ?1, value_secondary = ?2, notes = ?3 WHERE id = ?4",
        params![value, value_secondary, notes, id.to_string()],
    )?;
    owned_metric(conn, id, user_id)
}

pub fn delete_health_metric(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<(), DatabaseError> {
    owned_metric(conn, id, user_id)?;
    conn.execute("DELETE FROM health_metrics WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

/// Primary values of one metric type, oldest first — the series the
/// trend classifier consumes.
pub fn metric_value_series(
    conn: &Connection,
    user_id: &Uuid,
    metric_type: MetricType,
    since: NaiveDateTime,
) -> Result<Vec<f64>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT value FROM health_metrics
         WHERE user_id = ?1 AND metric_type = ?2 AND recorded_at >= ?3
         ORDER BY recorded_at",
    )?;
    let rows = stmt.query_map(
        params![user_id.to_string(), metric_type.as_str(), fmt_datetime(since)],
        |row| row.get::<_, f64>(0),
    )?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Distinct metric types the user recorded in the window.
pub fn recorded_metric_types(
    conn: &Connection,
    user_id: &Uuid,
    since: NaiveDateTime,
) -> Result<Vec<MetricType>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT metric_type FROM health_metrics
         WHERE user_id = ?1 AND recorded_at >= ?2
         ORDER BY metric_type",
    )?;
    let rows = stmt.query_map(
        params![user_id.to_string(), fmt_datetime(since)],
        |row| row.get::<_, String>(0),
    )?;

    let mut types = Vec::new();
    for row in rows {
        types.push(MetricType::from_str(&row?)?);
    }
    Ok(types)
}

/// Window-averaged blood pressure, if any readings exist.
pub fn blood_pressure_averages(
    conn: &Connection,
    user_id: &Uuid,
    since: NaiveDateTime,
) -> Result<Option<(f64, f64)>, DatabaseError> {
    let averages: (Option<f64>, Option<f64>) = conn.query_row(
        "SELECT AVG(value), AVG(value_secondary) FROM health_metrics
         WHERE user_id = ?1 AND metric_type = 'blood_pressure' AND recorded_at >= ?2",
        params![user_id.to_string(), fmt_datetime(since)],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    match averages {
        (Some(systolic), Some(diastolic)) => Ok(Some((systolic, diastolic))),
        _ => Ok(None),
    }
}
