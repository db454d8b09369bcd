//! Repository layer — entity-scoped database operations.
//!
//! One sub-module per domain. Every function takes a borrowed
//! `Connection`; callers open one per request and it is released when it
//! drops, on every exit path. All public functions are re-exported here.

mod announcement;
mod chat;
mod event;
mod exercise;
mod goal;
mod group;
mod health_metric;
mod medication;
mod meeting;
mod place;
mod review;
mod user;

pub use announcement::*;
pub use chat::*;
pub use event::*;
pub use exercise::*;
pub use goal::*;
pub use group::*;
pub use health_metric::*;
pub use medication::*;
pub use meeting::*;
pub use place::*;
pub use review::*;
pub use user::*;

use chrono::NaiveDateTime;

pub(crate) const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical storage format for timestamps.
pub(crate) fn fmt_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

/// Parse a stored timestamp, tolerating SQLite's `datetime('now')` output
/// as well as the bound format (both are the same shape).
pub(crate) fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT).unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use rusqlite::{params, Connection};
    use uuid::Uuid;

    use crate::db::sqlite::open_memory_database;

    pub fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    pub fn make_user(conn: &Connection, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO users (id, display_name, email) VALUES (?1, ?2, ?3)",
            params![id.to_string(), name, format!("{}@example.com", id.simple())],
        )
        .unwrap();
        id
    }

    pub fn make_group(conn: &Connection, creator: &Uuid, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO groups (id, name, created_by) VALUES (?1, ?2, ?3)",
            params![id.to_string(), name, creator.to_string()],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO group_members (group_id, user_id, role) VALUES (?1, ?2, 'admin')",
            params![id.to_string(), creator.to_string()],
        )
        .unwrap();
        id
    }

    pub fn add_member(conn: &Connection, group_id: &Uuid, user_id: &Uuid) {
        conn.execute(
            "INSERT INTO group_members (group_id, user_id) VALUES (?1, ?2)",
            params![group_id.to_string(), user_id.to_string()],
        )
        .unwrap();
    }

    pub fn make_medication(conn: &Connection, user_id: &Uuid, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO medications (id, user_id, name, dosage, frequency)
             VALUES (?1, ?2, ?3, '10mg', 'twice daily')",
            params![id.to_string(), user_id.to_string(), name],
        )
        .unwrap();
        id
    }

    /// Insert a dose log `days_ago` days before now, at the given hour.
    pub fn make_log(
        conn: &Connection,
        medication_id: &Uuid,
        days_ago: i64,
        hour: u32,
        taken: bool,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let when = (Utc::now() - chrono::Duration::days(days_ago))
            .date_naive()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        conn.execute(
            "INSERT INTO medication_logs (id, medication_id, scheduled_time, taken, taken_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.to_string(),
                medication_id.to_string(),
                super::fmt_datetime(when),
                taken as i32,
                taken.then(|| super::fmt_datetime(when)),
            ],
        )
        .unwrap();
        id
    }

    pub fn make_facility(conn: &Connection, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO facilities (id, name, category) VALUES (?1, ?2, 'community_center')",
            params![id.to_string(), name],
        )
        .unwrap();
        id
    }
}
