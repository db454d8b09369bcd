use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{fmt_datetime, parse_datetime};
use crate::db::DatabaseError;
use crate::models::enums::GoalStatus;
use crate::models::Goal;

pub fn insert_goal(conn: &Connection, goal: &Goal) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO goals (id, user_id, title, description, category, target_value,
         current_value, unit, due_date, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            goal.id.to_string(),
            goal.user_id.to_string(),
            goal.title,
            goal.description,
            goal.category,
            goal.target_value,
            goal.current_value,
            goal.unit,
            goal.due_date.map(|d| d.to_string()),
            goal.status.as_str(),
            fmt_datetime(goal.created_at),
        ],
    )?;
    Ok(())
}

fn goal_from_row(row: &rusqlite::Row<'_>) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        target_value: row.get(5)?,
        current_value: row.get(6)?,
        unit: row.get(7)?,
        due_date: row
            .get::<_, Option<String>>(8)?
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        status: GoalStatus::from_str(&row.get::<_, String>(9)?)
            .unwrap_or(GoalStatus::Active),
        created_at: parse_datetime(&row.get::<_, String>(10)?),
        updated_at: row.get::<_, Option<String>>(11)?.map(|s| parse_datetime(&s)),
    })
}

const GOAL_COLUMNS: &str = "id, user_id, title, description, category, target_value, \
     current_value, unit, due_date, status, created_at, updated_at";

pub fn get_goal(conn: &Connection, id: &Uuid) -> Result<Option<Goal>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1"),
        params![id.to_string()],
        goal_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// A user's goals, optionally restricted to one status, newest first.
pub fn list_goals(
    conn: &Connection,
    user_id: &Uuid,
    status: Option<GoalStatus>,
) -> Result<Vec<Goal>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GOAL_COLUMNS} FROM goals
         WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
         ORDER BY created_at DESC"
    ))?;

    let rows = stmt.query_map(
        params![user_id.to_string(), status.map(|s| s.as_str())],
        goal_from_row,
    )?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn owned_goal(conn: &Connection, id: &Uuid, user_id: &Uuid) -> Result<Goal, DatabaseError> {
    let goal = get_goal(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "goal".into(),
        id: id.to_string(),
    })?;
    if goal.user_id != *user_id {
        return Err(DatabaseError::Forbidden("not your goal".into()));
    }
    Ok(goal)
}

/// Owner-only field update; progress goes through `add_progress`.
pub fn update_goal(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
    title: &str,
    description: Option<&str>,
    target_value: f64,
    due_date: Option<NaiveDate>,
) -> Result<Goal, DatabaseError> {
    owned_goal(conn, id, user_id)?;
    conn.execute(
        "UPDATE goals SET title = ?1, description = ?2, target_value = ?3, due_date = ?4,
         updated_at = datetime('now') WHERE id = ?5",
        params![
            title,
            description,
            target_value,
            due_date.map(|d| d.to_string()),
            id.to_string(),
        ],
    )?;
    owned_goal(conn, id, user_id)
}

/// Add progress toward the target. The goal completes itself the moment
/// current reaches target.
pub fn add_progress(
    conn: &Connection,
    id: &Uuid,
    user_id: &Uuid,
    amount: f64,
) -> Result<Goal, DatabaseError> {
    let goal = owned_goal(conn, id, user_id)?;
    if goal.status != GoalStatus::Active {
        return Err(DatabaseError::Conflict(format!(
            "goal is {}, progress can no longer be recorded",
            goal.status.as_str()
        )));
    }

    let new_value = goal.current_value + amount;
    let new_status = if new_value >= goal.target_value {
        GoalStatus::Completed
    } else {
        GoalStatus::Active
    };

    conn.execute(
        "UPDATE goals SET current_value = ?1, status = ?2, updated_at = datetime('now')
         WHERE id = ?3",
        params![new_value, new_status.as_str(), id.to_string()],
    )?;
    owned_goal(conn, id, user_id)
}

pub fn delete_goal(conn: &Connection, id: &Uuid, user_id: &Uuid) -> Result<(), DatabaseError> {
    owned_goal(conn, id, user_id)?;
    conn.execute("DELETE FROM goals WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::*;
    use chrono::Utc;

    fn new_goal(user_id: Uuid, target: f64) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id,
            title: "Walk more".into(),
            description: None,
            category: "activity".into(),
            target_value: target,
            current_value: 0.0,
            unit: Some("km".into()),
            due_date: None,
            status: GoalStatus::Active,
            created_at: Utc::now().naive_utc(),
            updated_at: None,
        }
    }

    #[test]
    fn progress_accumulates_and_autocompletes() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let goal = new_goal(ada, 10.0);
        insert_goal(&conn, &goal).unwrap();

        let updated = add_progress(&conn, &goal.id, &ada, 4.0).unwrap();
        assert_eq!(updated.current_value, 4.0);
        assert_eq!(updated.status, GoalStatus::Active);

        let done = add_progress(&conn, &goal.id, &ada, 6.0).unwrap();
        assert_eq!(done.status, GoalStatus::Completed);
        assert_eq!(done.progress_percent(), 100);
    }

    #[test]
    fn progress_on_completed_goal_is_conflict() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let goal = new_goal(ada, 5.0);
        insert_goal(&conn, &goal).unwrap();
        add_progress(&conn, &goal.id, &ada, 5.0).unwrap();

        let err = add_progress(&conn, &goal.id, &ada, 1.0).unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[test]
    fn only_owner_touches_goal() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let bert = make_user(&conn, "Bert");
        let goal = new_goal(ada, 10.0);
        insert_goal(&conn, &goal).unwrap();

        assert!(matches!(
            add_progress(&conn, &goal.id, &bert, 1.0).unwrap_err(),
            DatabaseError::Forbidden(_)
        ));
        assert!(matches!(
            delete_goal(&conn, &goal.id, &bert).unwrap_err(),
            DatabaseError::Forbidden(_)
        ));
    }

    #[test]
    fn status_filter() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let active = new_goal(ada, 10.0);
        let finished = new_goal(ada, 1.0);
        insert_goal(&conn, &active).unwrap();
        insert_goal(&conn, &finished).unwrap();
        add_progress(&conn, &finished.id, &ada, 1.0).unwrap();

        assert_eq!(list_goals(&conn, &ada, None).unwrap().len(), 2);
        assert_eq!(
            list_goals(&conn, &ada, Some(GoalStatus::Completed)).unwrap().len(),
            1
        );
        assert_eq!(
            list_goals(&conn, &ada, Some(GoalStatus::Active)).unwrap().len(),
            1
        );
    }

    #[test]
    fn update_edits_fields() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let goal = new_goal(ada, 10.0);
        insert_goal(&conn, &goal).unwrap();

        let updated = update_goal(&conn, &goal.id, &ada, "Walk further", None, 15.0, None).unwrap();
        assert_eq!(updated.title, "Walk further");
        assert_eq!(updated.target_value, 15.0);
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn delete_missing_goal_is_not_found() {
        let conn = test_db();
        let ada = make_user(&conn, "Ada");
        let err = delete_goal(&conn, &Uuid::new_v4(), &ada).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
