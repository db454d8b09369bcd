//! Group endpoints: create, list mine, join.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{created, ok, ApiContext, ApiSuccess, UserContext};
use crate::db::repository;
use crate::models::Group;
use crate::validation::validate_required;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
}

/// `POST /api/groups` — create a group; the caller becomes its admin.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewGroup>,
) -> Result<(StatusCode, Json<ApiSuccess<Group>>), ApiError> {
    validate_required("name", &body.name).map_err(ApiError::Validation)?;

    let group = Group {
        id: Uuid::new_v4(),
        name: body.name,
        description: body.description,
        created_by: user.user_id,
        created_at: Utc::now().naive_utc(),
    };

    let conn = ctx.core.open_db()?;
    repository::insert_group(&conn, &group).map_err(ApiError::from)?;
    Ok(created("Group created", group))
}

/// `GET /api/groups` — groups the caller belongs to.
pub async fn list_mine(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<ApiSuccess<Vec<Group>>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let groups = repository::groups_for_user(&conn, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(groups))
}

/// `POST /api/groups/:id/join`
pub async fn join(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(group_id): Path<String>,
) -> Result<Json<ApiSuccess<Group>>, ApiError> {
    let group_id = parse_id(&group_id, "group")?;
    let conn = ctx.core.open_db()?;
    repository::join_group(&conn, &group_id, &user.user_id).map_err(ApiError::from)?;
    let group = repository::get_group(&conn, &group_id)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("group not found".into()))?;
    Ok(ok(group))
}
