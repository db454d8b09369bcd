use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::enums::GroupRole;
use crate::models::Group;

/// Create a group. The creator becomes its first member, as admin.
pub fn insert_group(conn: &Connection, group: &Group) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO groups (id, name, description, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            group.id.to_string(),
            group.name,
            group.description,
            group.created_by.to_string(),
            fmt_datetime(group.created_at),
        ],
    )?;
    conn.execute(
        "INSERT INTO group_members (group_id, user_id, role) VALUES (?1, ?2, ?3)",
        params![
            group.id.to_string(),
            group.created_by.to_string(),
            GroupRole::Admin.as_str(),
        ],
    )?;
    Ok(())
}

pub fn get_group(conn: &Connection, id: &Uuid) -> Result<Option<Group>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, description, created_by, created_at FROM groups WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        },
    )
    .optional()?
    .map(|(id, name, description, created_by, created_at)| {
        Ok(Group {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            name,
            description,
            created_by: Uuid::parse_str(&created_by)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            created_at: parse_datetime(&created_at),
        })
    })
    .transpose()
}

pub fn join_group(
    conn: &Connection,
    group_id: &Uuid,
    user_id: &Uuid,
) -> Result<(), DatabaseError> {
    if get_group(conn, group_id)?.is_none() {
        return Err(DatabaseError::NotFound {
            entity_type: "group".into(),
            id: group_id.to_string(),
        });
    }
    conn.execute(
        "INSERT INTO group_members (group_id, user_id, role) VALUES (?1, ?2, ?3)",
        params![
            group_id.to_string(),
            user_id.to_string(),
            GroupRole::Member.as_str(),
        ],
    )
    .map_err(|e| {
        if DatabaseError::is_unique_violation(&e) {
            DatabaseError::Conflict("already a member of this group".into())
        } else {
            e.into()
        }
    })?;
    Ok(())
}

pub fn groups_for_user(conn: &Connection, user_id: &Uuid) -> Result<Vec<Group>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.name, g.description, g.created_by, g.created_at
         FROM groups g
         JOIN group_members gm ON gm.group_id = g.id
         WHERE gm.user_id = ?1
         ORDER BY g.name",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], |row| {
        Ok(Group {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            name: row.get(1)?,
            description: row.get(2)?,
            created_by: Uuid::parse_str(&row.get::<_, String>(3)?).unwrap_or_default(),
            created_at: parse_datetime(&row.get::<_, String>(4)?),
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn is_member(
    conn: &Connection,
    group_id: &Uuid,
    user_id: &Uuid,
) -> Result<bool, DatabaseError> {
    let member: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM group_members WHERE group_id = ?1 AND user_id = ?2",
        params![group_id.to_string(), user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(member)
}

/// Membership gate used by every group-scoped write: fails with
/// `NotMember` before any row is touched.
pub fn ensure_member(
    conn: &Connection,
    group_id: &Uuid,
    user_id: &Uuid,
) -> Result<(), DatabaseError> {
    if is_member(conn, group_id, user_id)? {
        Ok(())
    } else {
        Err(DatabaseError::NotMember {
            group_id: group_id.to_string(),
        })
    }
}

pub fn member_role(
    conn: &Connection,
    group_id: &Uuid,
    user_id: &Uuid,
) -> Result<Option<GroupRole>, DatabaseError> {
    let role: Option<String> = conn
        .query_row(
            "SELECT role FROM group_members WHERE group_id = ?1 AND user_id = ?2",
            params![group_id.to_string(), user_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    role.map(|r| GroupRole::from_str(&r)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::*;
    use chrono::Utc;

    fn new_group(created_by: Uuid) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: "Morning Walkers".into(),
            description: Some("Daily walks in the park".into()),
            created_by,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn creator_becomes_admin_member() {
        let conn = test_db();
        let user_id = make_user(&conn, "Ada");
        let group = new_group(user_id);
        insert_group(&conn, &group).unwrap();

        assert!(is_member(&conn, &group.id, &user_id).unwrap());
        assert_eq!(
            member_role(&conn, &group.id, &user_id).unwrap(),
            Some(GroupRole::Admin)
        );
    }

    #[test]
    fn join_then_listed_in_groups_for_user() {
        let conn = test_db();
        let creator = make_user(&conn, "Ada");
        let joiner = make_user(&conn, "Bert");
        let group = new_group(creator);
        insert_group(&conn, &group).unwrap();

        join_group(&conn, &group.id, &joiner).unwrap();
        let groups = groups_for_user(&conn, &joiner).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Morning Walkers");
        assert_eq!(
            member_role(&conn, &group.id, &joiner).unwrap(),
            Some(GroupRole::Member)
        );
    }

    #[test]
    fn double_join_is_conflict() {
        let conn = test_db();
        let creator = make_user(&conn, "Ada");
        let joiner = make_user(&conn, "Bert");
        let group = new_group(creator);
        insert_group(&conn, &group).unwrap();

        join_group(&conn, &group.id, &joiner).unwrap();
        let err = join_group(&conn, &group.id, &joiner).unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[test]
    fn join_missing_group_is_not_found() {
        let conn = test_db();
        let user_id = make_user(&conn, "Ada");
        let err = join_group(&conn, &Uuid::new_v4(), &user_id).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn ensure_member_rejects_outsider() {
        let conn = test_db();
        let creator = make_user(&conn, "Ada");
        let outsider = make_user(&conn, "Cleo");
        let group_id = make_group(&conn, &creator, "Book Club");

        assert!(ensure_member(&conn, &group_id, &creator).is_ok());
        let err = ensure_member(&conn, &group_id, &outsider).unwrap_err();
        assert!(matches!(err, DatabaseError::NotMember { .. }));
        assert_eq!(err.code(), "NOT_MEMBER");
    }
}
