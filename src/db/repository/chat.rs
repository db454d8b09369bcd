use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::group::ensure_member;
use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::{Conversation, Message};

/// Start a conversation in a group. Member-only.
pub fn insert_conversation(
    conn: &Connection,
    conversation: &Conversation,
    creator_id: &Uuid,
) -> Result<(), DatabaseError> {
    ensure_member(conn, &conversation.group_id, creator_id)?;
    conn.execute(
        "INSERT INTO conversations (id, group_id, title, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            conversation.id.to_string(),
            conversation.group_id.to_string(),
            conversation.title,
            fmt_datetime(conversation.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_conversation(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Conversation>, DatabaseError> {
    conn.query_row(
        "SELECT id, group_id, title, created_at FROM conversations WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(Conversation {
                id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                group_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
                title: row.get(2)?,
                created_at: parse_datetime(&row.get::<_, String>(3)?),
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Conversations in a group, most recent first. Member-only.
pub fn list_conversations(
    conn: &Connection,
    group_id: &Uuid,
    viewer_id: &Uuid,
) -> Result<Vec<Conversation>, DatabaseError> {
    ensure_member(conn, group_id, viewer_id)?;
    let mut stmt = conn.prepare(
        "SELECT id, group_id, title, created_at
         FROM conversations WHERE group_id = ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![group_id.to_string()], |row| {
        Ok(Conversation {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            group_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
            title: row.get(2)?,
            created_at: parse_datetime(&row.get::<_, String>(3)?),
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Resolve a conversation and gate on membership of its group.
fn conversation_for_member(
    conn: &Connection,
    conversation_id: &Uuid,
    user_id: &Uuid,
) -> Result<Conversation, DatabaseError> {
    let conversation =
        get_conversation(conn, conversation_id)?.ok_or_else(|| DatabaseError::NotFound {
            entity_type: "conversation".into(),
            id: conversation_id.to_string(),
        })?;
    ensure_member(conn, &conversation.group_id, user_id)?;
    Ok(conversation)
}

/// Send a message. Member-only via the conversation's group.
pub fn insert_message(conn: &Connection, message: &Message) -> Result<(), DatabaseError> {
    conversation_for_member(conn, &message.conversation_id, &message.sender_id)?;
    conn.execute(
        "INSERT INTO messages (id, conversation_id, sender_id, body, sent_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            message.id.to_string(),
            message.conversation_id.to_string(),
            message.sender_id.to_string(),
            message.body,
            fmt_datetime(message.sent_at),
        ],
    )?;
    Ok(())
}

/// Messages in a conversation, oldest first. Member-only.
pub fn list_messages(
    conn: &Connection,
    conversation_id: &Uuid,
    viewer_id: &Uuid,
    limit: u32,
) -> Result<Vec<Message>, DatabaseError> {
    conversation_for_member(conn, conversation_id, viewer_id)?;
    let mut stmt = conn.prepare(
        "SELECT id, conversation_id, sender_id, body, sent_at
         FROM messages WHERE conversation_id = ?1
         ORDER BY sent_at LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![conversation_id.to_string(), limit], |row| {
        Ok(Message {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            conversation_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
            sender_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap_or_default(),
            body: row.get(3)?,
            sent_at: parse_datetime(&row.get::<_, String>(4)?),
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
