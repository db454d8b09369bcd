//! Goal endpoints: create, browse, edit, progress, delete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{created, ok, ApiContext, ApiSuccess, UserContext};
use crate::db::repository;
use crate::models::enums::GoalStatus;
use crate::models::Goal;
use crate::validation::{validate_goal_target, validate_required};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub target_value: f64,
    pub unit: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// `POST /api/goals`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewGoal>,
) -> Result<(StatusCode, Json<ApiSuccess<Goal>>), ApiError> {
    validate_required("title", &body.title).map_err(ApiError::Validation)?;
    validate_required("category", &body.category).map_err(ApiError::Validation)?;
    validate_goal_target(body.target_value).map_err(ApiError::Validation)?;

    let goal = Goal {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        title: body.title,
        description: body.description,
        category: body.category,
        target_value: body.target_value,
        current_value: 0.0,
        unit: body.unit,
        due_date: body.due_date,
        status: GoalStatus::Active,
        created_at: Utc::now().naive_utc(),
        updated_at: None,
    };

    let conn = ctx.core.open_db()?;
    repository::insert_goal(&conn, &goal).map_err(ApiError::from)?;
    Ok(created("Goal created", goal))
}

#[derive(Deserialize)]
pub struct GoalListQuery {
    pub status: Option<GoalStatus>,
}

/// `GET /api/goals?status=`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<GoalListQuery>,
) -> Result<Json<ApiSuccess<Vec<Goal>>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let goals =
        repository::list_goals(&conn, &user.user_id, query.status).map_err(ApiError::from)?;
    Ok(ok(goals))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalEdit {
    pub title: String,
    pub description: Option<String>,
    pub target_value: f64,
    pub due_date: Option<NaiveDate>,
}

/// `PUT /api/goals/:id` — owner-only.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(body): Json<GoalEdit>,
) -> Result<Json<ApiSuccess<Goal>>, ApiError> {
    validate_required("title", &body.title).map_err(ApiError::Validation)?;
    validate_goal_target(body.target_value).map_err(ApiError::Validation)?;
    let id = parse_id(&id, "goal")?;

    let conn = ctx.core.open_db()?;
    let goal = repository::update_goal(
        &conn,
        &id,
        &user.user_id,
        &body.title,
        body.description.as_deref(),
        body.target_value,
        body.due_date,
    )
    .map_err(ApiError::from)?;
    Ok(ok(goal))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub amount: f64,
}

/// `POST /api/goals/:id/progress` — owner-only; the goal completes
/// itself when the target is reached.
pub async fn progress(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(body): Json<ProgressUpdate>,
) -> Result<Json<ApiSuccess<Goal>>, ApiError> {
    if !body.amount.is_finite() || body.amount <= 0.0 {
        return Err(ApiError::Validation(vec![
            "amount must be greater than 0".into(),
        ]));
    }
    let id = parse_id(&id, "goal")?;

    let conn = ctx.core.open_db()?;
    let goal =
        repository::add_progress(&conn, &id, &user.user_id, body.amount).map_err(ApiError::from)?;
    Ok(ok(goal))
}

/// `DELETE /api/goals/:id` — owner-only.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<()>>, ApiError> {
    let id = parse_id(&id, "goal")?;
    let conn = ctx.core.open_db()?;
    repository::delete_goal(&conn, &id, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(()))
}
