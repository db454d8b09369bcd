use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::group::ensure_member;
use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::Meeting;

/// Schedule a meeting. Member-only; the host becomes the meeting owner.
pub fn insert_meeting(conn: &Connection, meeting: &Meeting) -> Result<(), DatabaseError> {
    ensure_member(conn, &meeting.group_id, &meeting.host_id)?;
    conn.execute(
        "INSERT INTO meetings (id, group_id, host_id, title, room_name, scheduled_at,
         duration_minutes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            meeting.id.to_string(),
            meeting.group_id.to_string(),
            meeting.host_id.to_string(),
            meeting.title,
            meeting.room_name,
            fmt_datetime(meeting.scheduled_at),
            meeting.duration_minutes,
            fmt_datetime(meeting.created_at),
        ],
    )?;
    Ok(())
}

fn meeting_from_row(row: &rusqlite::Row<'_>) -> Result<Meeting, rusqlite::Error> {
    Ok(Meeting {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        group_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        host_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap_or_default(),
        title: row.get(3)?,
        room_name: row.get(4)?,
        scheduled_at: parse_datetime(&row.get::<_, String>(5)?),
        duration_minutes: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

pub fn get_meeting(conn: &Connection, id: &Uuid) -> Result<Option<Meeting>, DatabaseError> {
    conn.query_row(
        "SELECT id, group_id, host_id, title, room_name, scheduled_at, duration_minutes, created_at
         FROM meetings WHERE id = ?1",
        params![id.to_string()],
        meeting_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Meetings of a group, soonest first. Member-only.
pub fn list_meetings(
    conn: &Connection,
    group_id: &Uuid,
    viewer_id: &Uuid,
    upcoming_only: bool,
) -> Result<Vec<Meeting>, DatabaseError> {
    ensure_member(conn, group_id, viewer_id)?;
    let now = fmt_datetime(chrono::Utc::now().naive_utc());
    let mut stmt = conn.prepare(
        "SELECT id, group_id, host_id, title, room_name, scheduled_at, duration_minutes, created_at
         FROM meetings
         WHERE group_id = ?1 AND (?2 = 0 OR scheduled_at >= ?3)
         ORDER BY scheduled_at",
    )?;

    let rows = stmt.query_map(
        params![group_id.to_string(), upcoming_only as i32, now],
        meeting_from_row,
    )?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
