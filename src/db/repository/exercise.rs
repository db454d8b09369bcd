use std::str::FromStr;

use chrono::{Duration, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::enums::{ExerciseActivity, ExerciseIntensity};
use crate::models::Exercise;

pub fn insert_exercise(conn: &Connection, exercise: &Exercise) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO exercises (id, user_id, activity, duration_minutes, intensity, notes, performed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            exercise.id.to_string(),
            exercise.user_id.to_string(),
            exercise.activity.as_str(),
            exercise.duration_minutes,
            exercise.intensity.map(|i| i.as_str()),
            exercise.notes,
            fmt_datetime(exercise.performed_at),
        ],
    )?;
    Ok(())
}

/// A user's sessions within the last `days` days, newest first.
pub fn list_exercises(
    conn: &Connection,
    user_id: &Uuid,
    days: u32,
) -> Result<Vec<Exercise>, DatabaseError> {
    let since = fmt_datetime(Utc::now().naive_utc() - Duration::days(i64::from(days)));
    let mut stmt = conn.prepare(
        "SELECT id, user_id, activity, duration_minutes, intensity, notes, performed_at
         FROM exercises
         WHERE user_id = ?1 AND performed_at >= ?2
         ORDER BY performed_at DESC",
    )?;

    let rows = stmt.query_map(params![user_id.to_string(), since], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, u32>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut exercises = Vec::new();
    for row in rows {
        let (id, user_id, activity, duration, intensity, notes, performed_at) = row?;
        exercises.push(Exercise {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            activity: ExerciseActivity::from_str(&activity)?,
            duration_minutes: duration,
            intensity: intensity.map(|i| ExerciseIntensity::from_str(&i)).transpose()?,
            notes,
            performed_at: parse_datetime(&performed_at),
        });
    }
    Ok(exercises)
}

/// Aggregated activity stats for the summary card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSummary {
    pub total_sessions: u32,
    pub total_minutes: u32,
    pub active_days: u32,
    pub by_activity: Vec<ActivityBreakdown>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityBreakdown {
    pub activity: String,
    pub sessions: u32,
    pub minutes: u32,
}

pub fn exercise_summary(
    conn: &Connection,
    user_id: &Uuid,
    days: u32,
) -> Result<ExerciseSummary, DatabaseError> {
    let since = fmt_datetime(Utc::now().naive_utc() - Duration::days(i64::from(days)));

    let (total_sessions, total_minutes): (u32, u32) = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(duration_minutes), 0)
         FROM exercises WHERE user_id = ?1 AND performed_at >= ?2",
        params![user_id.to_string(), since],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let active_days: u32 = conn.query_row(
        "SELECT COUNT(DISTINCT date(performed_at))
         FROM exercises WHERE user_id = ?1 AND performed_at >= ?2",
        params![user_id.to_string(), since],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT activity, COUNT(*), SUM(duration_minutes)
         FROM exercises
         WHERE user_id = ?1 AND performed_at >= ?2
         GROUP BY activity
         ORDER BY SUM(duration_minutes) DESC",
    )?;
    let rows = stmt.query_map(params![user_id.to_string(), since], |row| {
        Ok(ActivityBreakdown {
            activity: row.get(0)?,
            sessions: row.get(1)?,
            minutes: row.get(2)?,
        })
    })?;
    let by_activity = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::from)?;

    Ok(ExerciseSummary {
        total_sessions,
        total_minutes,
        active_days,
        by_activity,
    })
}
