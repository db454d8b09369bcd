use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::{Medication, MedicationLog};

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, user_id, name, dosage, frequency, instructions, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            med.id.to_string(),
            med.user_id.to_string(),
            med.name,
            med.dosage,
            med.frequency,
            med.instructions,
            med.active as i32,
            fmt_datetime(med.created_at),
        ],
    )?;
    Ok(())
}

fn medication_from_row(row: &rusqlite::Row<'_>) -> Result<Medication, rusqlite::Error> {
    Ok(Medication {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        name: row.get(2)?,
        dosage: row.get(3)?,
        frequency: row.get(4)?,
        instructions: row.get(5)?,
        active: row.get::<_, i32>(6)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

pub fn get_medication(conn: &Connection, id: &Uuid) -> Result<Option<Medication>, DatabaseError> {
    conn.query_row(
        "SELECT id, user_id, name, dosage, frequency, instructions, active, created_at
         FROM medications WHERE id = ?1",
        params![id.to_string()],
        medication_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// A user's active medications, alphabetical.
pub fn list_active_medications(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, dosage, frequency, instructions, active, created_at
         FROM medications WHERE user_id = ?1 AND active = 1 ORDER BY name",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], medication_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn owned_medication(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<Medication, DatabaseError> {
    let med = get_medication(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "medication".into(),
        id: id.to_string(),
    })?;
    if med.user_id != *user_id {
        return Err(DatabaseError::Forbidden("not your medication".into()));
    }
    Ok(med)
}

/// Soft-deactivate. Logs stay; nothing is deleted.
pub fn deactivate_medication(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<Medication, DatabaseError> {
    owned_medication(conn, id, user_id)?;
    conn.execute(
        "UPDATE medications SET active = 0 WHERE id = ?1",
        params![id.to_string()],
    )?;
    owned_medication(conn, id, user_id)
}

/// Insert a scheduled-dose row. Called by the external dose scheduler,
/// never by an HTTP handler.
pub fn insert_medication_log(conn: &Connection, log: &MedicationLog) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medication_logs (id, medication_id, scheduled_time, taken, taken_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            log.id.to_string(),
            log.medication_id.to_string(),
            fmt_datetime(log.scheduled_time),
            log.taken as i32,
            log.taken_at.map(fmt_datetime),
        ],
    )?;
    Ok(())
}

pub fn get_medication_log(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<MedicationLog>, DatabaseError> {
    conn.query_row(
        "SELECT id, medication_id, scheduled_time, taken, taken_at
         FROM medication_logs WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(MedicationLog {
                id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                medication_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
                scheduled_time: parse_datetime(&row.get::<_, String>(2)?),
                taken: row.get::<_, i32>(3)? != 0,
                taken_at: row.get::<_, Option<String>>(4)?.map(|s| parse_datetime(&s)),
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Mark a dose taken. The row is mutated exactly once: marking an
/// already-taken dose is a conflict, not a no-op.
pub fn mark_dose_taken(
    conn: &Connection,
    log_id: &Uuid,
    user_id: &Uuid,
) -> Result<MedicationLog, DatabaseError> {
    let log = get_medication_log(conn, log_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "medication log".into(),
        id: log_id.to_string(),
    })?;
    owned_medication(conn, &log.medication_id, user_id)?;

    if log.taken {
        return Err(DatabaseError::Conflict("dose already marked taken".into()));
    }

    conn.execute(
        "UPDATE medication_logs SET taken = 1, taken_at = datetime('now') WHERE id = ?1",
        params![log_id.to_string()],
    )?;
    get_medication_log(conn, log_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "medication log".into(),
        id: log_id.to_string(),
    })
}

/// Taken flags for one medication within the window, for compliance
/// aggregation.
pub fn taken_flags_for_medication(
    conn: &Connection,
    medication_id: &Uuid,
    since: chrono::NaiveDateTime,
) -> Result<Vec<bool>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT taken FROM medication_logs
         WHERE medication_id = ?1 AND scheduled_time >= ?2
         ORDER BY scheduled_time",
    )?;
    let rows = stmt.query_map(
        params![medication_id.to_string(), fmt_datetime(since)],
        |row| Ok(row.get::<_, i32>(0)? != 0),
    )?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
