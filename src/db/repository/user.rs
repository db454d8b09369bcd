use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::{EmergencyContact, User};

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, display_name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            user.id.to_string(),
            user.display_name,
            user.email,
            fmt_datetime(user.created_at),
        ],
    )
    .map_err(|e| {
        if DatabaseError::is_unique_violation(&e) {
            DatabaseError::Conflict(format!("email {} already registered", user.email))
        } else {
            e.into()
        }
    })?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    conn.query_row(
        "SELECT id, display_name, email, created_at FROM users WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        },
    )
    .optional()?
    .map(|(id, display_name, email, created_at)| {
        Ok(User {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            display_name,
            email,
            created_at: parse_datetime(&created_at),
        })
    })
    .transpose()
}

/// Identity check used by the request layer: does this user exist at all?
pub fn user_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn insert_emergency_contact(
    conn: &Connection,
    contact: &EmergencyContact,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO emergency_contacts (id, user_id, name, phone, relation)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            contact.id.to_string(),
            contact.user_id.to_string(),
            contact.name,
            contact.phone,
            contact.relation,
        ],
    )?;
    Ok(())
}

pub fn get_emergency_contacts(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<EmergencyContact>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, phone, relation
         FROM emergency_contacts WHERE user_id = ?1 ORDER BY name",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], |row| {
        Ok(EmergencyContact {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
            name: row.get(2)?,
            phone: row.get(3)?,
            relation: row.get(4)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
