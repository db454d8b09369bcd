use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::group::ensure_member;
use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::{Announcement, AnnouncementComment};

/// Post an announcement to a group. Member-only.
pub fn insert_announcement(
    conn: &Connection,
    announcement: &Announcement,
) -> Result<(), DatabaseError> {
    ensure_member(conn, &announcement.group_id, &announcement.author_id)?;
    conn.execute(
        "INSERT INTO announcements (id, group_id, author_id, title, body, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            announcement.id.to_string(),
            announcement.group_id.to_string(),
            announcement.author_id.to_string(),
            announcement.title,
            announcement.body,
            fmt_datetime(announcement.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_announcement(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Announcement>, DatabaseError> {
    conn.query_row(
        "SELECT id, group_id, author_id, title, body, created_at, updated_at
         FROM announcements WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(Announcement {
                id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                group_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
                author_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap_or_default(),
                title: row.get(3)?,
                body: row.get(4)?,
                created_at: parse_datetime(&row.get::<_, String>(5)?),
                updated_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Announcements of a group, newest first. Member-only.
pub fn list_announcements(
    conn: &Connection,
    group_id: &Uuid,
    viewer_id: &Uuid,
) -> Result<Vec<Announcement>, DatabaseError> {
    ensure_member(conn, group_id, viewer_id)?;
    let mut stmt = conn.prepare(
        "SELECT id, group_id, author_id, title, body, created_at, updated_at
         FROM announcements WHERE group_id = ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![group_id.to_string()], |row| {
        Ok(Announcement {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            group_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
            author_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap_or_default(),
            title: row.get(3)?,
            body: row.get(4)?,
            created_at: parse_datetime(&row.get::<_, String>(5)?),
            updated_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Edit title/body. Author-only.
pub fn update_announcement(
    conn: &Connection,
    id: &Uuid,
    editor_id: &Uuid,
    title: &str,
    body: &str,
) -> Result<Announcement, DatabaseError> {
    let existing = get_announcement(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "announcement".into(),
        id: id.to_string(),
    })?;
    if existing.author_id != *editor_id {
        return Err(DatabaseError::Forbidden(
            "only the author can edit an announcement".into(),
        ));
    }
    conn.execute(
        "UPDATE announcements SET title = ?1, body = ?2, updated_at = datetime('now')
         WHERE id = ?3",
        params![title, body, id.to_string()],
    )?;
    get_announcement(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "announcement".into(),
        id: id.to_string(),
    })
}

/// Delete an announcement and its comments (FK cascade). Author-only.
pub fn delete_announcement(
    conn: &Connection,
    id: &Uuid,
    editor_id: &Uuid,
) -> Result<(), DatabaseError> {
    let existing = get_announcement(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "announcement".into(),
        id: id.to_string(),
    })?;
    if existing.author_id != *editor_id {
        return Err(DatabaseError::Forbidden(
            "only the author can delete an announcement".into(),
        ));
    }
    conn.execute("DELETE FROM announcements WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

/// Comment on an announcement. The commenter must belong to the
/// announcement's group — checked before anything is written.
pub fn insert_comment(
    conn: &Connection,
    comment: &AnnouncementComment,
) -> Result<(), DatabaseError> {
    let announcement =
        get_announcement(conn, &comment.announcement_id)?.ok_or_else(|| DatabaseError::NotFound {
            entity_type: "announcement".into(),
            id: comment.announcement_id.to_string(),
        })?;
    ensure_member(conn, &announcement.group_id, &comment.author_id)?;

    conn.execute(
        "INSERT INTO announcement_comments (id, announcement_id, author_id, body, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            comment.id.to_string(),
            comment.announcement_id.to_string(),
            comment.author_id.to_string(),
            comment.body,
            fmt_datetime(comment.created_at),
        ],
    )?;
    Ok(())
}

/// Comments on an announcement, oldest first. Member-only.
pub fn list_comments(
    conn: &Connection,
    announcement_id: &Uuid,
    viewer_id: &Uuid,
) -> Result<Vec<AnnouncementComment>, DatabaseError> {
    let announcement =
        get_announcement(conn, announcement_id)?.ok_or_else(|| DatabaseError::NotFound {
            entity_type: "announcement".into(),
            id: announcement_id.to_string(),
        })?;
    ensure_member(conn, &announcement.group_id, viewer_id)?;

    let mut stmt = conn.prepare(
        "SELECT id, announcement_id, author_id, body, created_at
         FROM announcement_comments WHERE announcement_id = ?1 ORDER BY created_at",
    )?;

    let rows = stmt.query_map(params![announcement_id.to_string()], |row| {
        Ok(AnnouncementComment {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            announcement_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
            author_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap_or_default(),
            body: row.get(3)?,
            created_at: parse_datetime(&row.get::<_, String>(4)?),
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
