use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::group::ensure_member;
use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::GroupEvent;

/// Create a group event. Member-only.
pub fn insert_event(conn: &Connection, event: &GroupEvent) -> Result<(), DatabaseError> {
    ensure_member(conn, &event.group_id, &event.organizer_id)?;
    conn.execute(
        "INSERT INTO events (id, group_id, organizer_id, title, description, location,
         starts_at, ends_at, capacity, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            event.id.to_string(),
            event.group_id.to_string(),
            event.organizer_id.to_string(),
            event.title,
            event.description,
            event.location,
            fmt_datetime(event.starts_at),
            event.ends_at.map(fmt_datetime),
            event.capacity,
            fmt_datetime(event.created_at),
        ],
    )?;
    Ok(())
}

fn event_from_row(row: &rusqlite::Row<'_>) -> Result<GroupEvent, rusqlite::Error> {
    Ok(GroupEvent {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        group_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        organizer_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap_or_default(),
        title: row.get(3)?,
        description: row.get(4)?,
        location: row.get(5)?,
        starts_at: parse_datetime(&row.get::<_, String>(6)?),
        ends_at: row.get::<_, Option<String>>(7)?.map(|s| parse_datetime(&s)),
        capacity: row.get(8)?,
        created_at: parse_datetime(&row.get::<_, String>(9)?),
    })
}

pub fn get_event(conn: &Connection, id: &Uuid) -> Result<Option<GroupEvent>, DatabaseError> {
    conn.query_row(
        "SELECT id, group_id, organizer_id, title, description, location,
         starts_at, ends_at, capacity, created_at
         FROM events WHERE id = ?1",
        params![id.to_string()],
        event_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Events in a group, soonest first. `upcoming_only` filters out events
/// that have already started. Member-only.
pub fn list_events(
    conn: &Connection,
    group_id: &Uuid,
    viewer_id: &Uuid,
    upcoming_only: bool,
) -> Result<Vec<GroupEvent>, DatabaseError> {
    ensure_member(conn, group_id, viewer_id)?;
    let now = fmt_datetime(chrono::Utc::now().naive_utc());
    let mut stmt = conn.prepare(
        "SELECT id, group_id, organizer_id, title, description, location,
         starts_at, ends_at, capacity, created_at
         FROM events
         WHERE group_id = ?1 AND (?2 = 0 OR starts_at >= ?3)
         ORDER BY starts_at",
    )?;

    let rows = stmt.query_map(
        params![group_id.to_string(), upcoming_only as i32, now],
        event_from_row,
    )?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn participant_count(conn: &Connection, event_id: &Uuid) -> Result<u32, DatabaseError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM event_participants WHERE event_id = ?1",
        params![event_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Join an event. Member-only; full events and repeat joins are conflicts.
pub fn join_event(conn: &Connection, event_id: &Uuid, user_id: &Uuid) -> Result<(), DatabaseError> {
    let event = get_event(conn, event_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "event".into(),
        id: event_id.to_string(),
    })?;
    ensure_member(conn, &event.group_id, user_id)?;

    if let Some(capacity) = event.capacity {
        if participant_count(conn, event_id)? >= capacity {
            return Err(DatabaseError::Conflict("event is full".into()));
        }
    }

    conn.execute(
        "INSERT INTO event_participants (event_id, user_id) VALUES (?1, ?2)",
        params![event_id.to_string(), user_id.to_string()],
    )
    .map_err(|e| {
        if DatabaseError::is_unique_violation(&e) {
            DatabaseError::Conflict("already joined this event".into())
        } else {
            e.into()
        }
    })?;
    Ok(())
}

pub fn leave_event(
    conn: &Connection,
    event_id: &Uuid,
    user_id: &Uuid,
) -> Result<(), DatabaseError> {
    let removed = conn.execute(
        "DELETE FROM event_participants WHERE event_id = ?1 AND user_id = ?2",
        params![event_id.to_string(), user_id.to_string()],
    )?;
    if removed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "event participation".into(),
            id: event_id.to_string(),
        });
    }
    Ok(())
}
