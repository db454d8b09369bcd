use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::Place;

pub fn insert_place(conn: &Connection, place: &Place) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO places (id, user_id, label, address, latitude, longitude, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            place.id.to_string(),
            place.user_id.to_string(),
            place.label,
            place.address,
            place.latitude,
            place.longitude,
            fmt_datetime(place.created_at),
        ],
    )?;
    Ok(())
}

fn place_from_row(row: &rusqlite::Row<'_>) -> Result<Place, rusqlite::Error> {
    Ok(Place {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        label: row.get(2)?,
        address: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

pub fn get_place(conn: &Connection, id: &Uuid) -> Result<Option<Place>, DatabaseError> {
    conn.query_row(
        "SELECT id, user_id, label, address, latitude, longitude, created_at
         FROM places WHERE id = ?1",
        params![id.to_string()],
        place_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_places(conn: &Connection, user_id: &Uuid) -> Result<Vec<Place>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, label, address, latitude, longitude, created_at
         FROM places WHERE user_id = ?1 ORDER BY label",
    )?;
    let rows = stmt.query_map(params![user_id.to_string()], place_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn delete_place(conn: &Connection, id: &Uuid, user_id: &Uuid) -> Result<(), DatabaseError> {
    let place = get_place(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "place".into(),
        id: id.to_string(),
    })?;
    if place.user_id != *user_id {
        return Err(DatabaseError::Forbidden("not your saved place".into()));
    }
    conn.execute("DELETE FROM places WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}
