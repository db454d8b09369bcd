use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::{Facility, Review};

pub fn insert_facility(conn: &Connection, facility: &Facility) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO facilities (id, name, category, address, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            facility.id.to_string(),
            facility.name,
            facility.category,
            facility.address,
            fmt_datetime(facility.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_facility(conn: &Connection, id: &Uuid) -> Result<Option<Facility>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, category, address, created_at FROM facilities WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(Facility {
                id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                name: row.get(1)?,
                category: row.get(2)?,
                address: row.get(3)?,
                created_at: parse_datetime(&row.get::<_, String>(4)?),
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_facilities(conn: &Connection) -> Result<Vec<Facility>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category, address, created_at FROM facilities ORDER BY name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Facility {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            name: row.get(1)?,
            category: row.get(2)?,
            address: row.get(3)?,
            created_at: parse_datetime(&row.get::<_, String>(4)?),
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Submit a review. The storage-level UNIQUE(facility_id, user_id)
/// resolves duplicate submissions; it surfaces here as `Conflict`, which
/// the API maps to 409 — distinguishable from any generic failure.
pub fn insert_review(conn: &Connection, review: &Review) -> Result<(), DatabaseError> {
    if get_facility(conn, &review.facility_id)?.is_none() {
        return Err(DatabaseError::NotFound {
            entity_type: "facility".into(),
            id: review.facility_id.to_string(),
        });
    }
    conn.execute(
        "INSERT INTO reviews (id, facility_id, user_id, rating, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            review.id.to_string(),
            review.facility_id.to_string(),
            review.user_id.to_string(),
            review.rating,
            review.comment,
            fmt_datetime(review.created_at),
        ],
    )
    .map_err(|e| {
        if DatabaseError::is_unique_violation(&e) {
            DatabaseError::Conflict("you have already reviewed this facility".into())
        } else {
            e.into()
        }
    })?;
    Ok(())
}

fn review_from_row(row: &rusqlite::Row<'_>) -> Result<Review, rusqlite::Error> {
    Ok(Review {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        facility_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        user_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap_or_default(),
        rating: row.get(3)?,
        comment: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
    })
}

pub fn get_review(conn: &Connection, id: &Uuid) -> Result<Option<Review>, DatabaseError> {
    conn.query_row(
        "SELECT id, facility_id, user_id, rating, comment, created_at, updated_at
         FROM reviews WHERE id = ?1",
        params![id.to_string()],
        review_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_reviews_for_facility(
    conn: &Connection,
    facility_id: &Uuid,
) -> Result<Vec<Review>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, facility_id, user_id, rating, comment, created_at, updated_at
         FROM reviews WHERE facility_id = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![facility_id.to_string()], review_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Reviews of a facility plus the aggregate, fetched together for the
/// facility page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityReviews {
    pub facility: Facility,
    pub reviews: Vec<Review>,
    pub review_count: u32,
    pub average_rating: Option<f64>,
}

pub fn facility_reviews(
    conn: &Connection,
    facility_id: &Uuid,
) -> Result<FacilityReviews, DatabaseError> {
    let facility = get_facility(conn, facility_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "facility".into(),
        id: facility_id.to_string(),
    })?;
    let reviews = list_reviews_for_facility(conn, facility_id)?;

    let average_rating: Option<f64> = conn.query_row(
        "SELECT AVG(rating) FROM reviews WHERE facility_id = ?1",
        params![facility_id.to_string()],
        |row| row.get(0),
    )?;

    Ok(FacilityReviews {
        review_count: reviews.len() as u32,
        facility,
        reviews,
        average_rating,
    })
}

fn owned_review(conn: &Connection, id: &Uuid, user_id: &Uuid) -> Result<Review, DatabaseError> {
    let review = get_review(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "review".into(),
        id: id.to_string(),
    })?;
    if review.user_id != *user_id {
        return Err(DatabaseError::Forbidden(
            "only the author can modify a review".into(),
        ));
    }
    Ok(review)
}

pub fn update_review(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
    rating: u8,
    comment: Option<&str>,
) -> Result<Review, DatabaseError> {
    owned_review(conn, id, user_id)?;
    conn.execute(
        "UPDATE reviews SET rating = ?1, comment = ?2, updated_at = datetime('now') WHERE id = ?3",
        params![rating, comment, id.to_string()],
    )?;
    owned_review(conn, id, user_id)
}

pub fn delete_review(conn: &Connection, id: &Uuid, user_id: &Uuid) -> Result<(), DatabaseError> {
    owned_review(conn, id, user_id)?;
    conn.execute("DELETE FROM reviews WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}
