//! Meeting endpoints.
//!
//! Silverline stores meetings and their room names; the actual video
//! room is served by an external provider reachable at the configured
//! base URL.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{created, ok, ApiContext, ApiSuccess, UserContext};
use crate::config;
use crate::db::repository;
use crate::models::Meeting;
use crate::validation::validate_required;

const DEFAULT_DURATION_MINUTES: u32 = 60;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeeting {
    pub title: String,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: Option<u32>,
}

/// `POST /api/groups/:id/meetings` — member-only; a unique room name is
/// generated for the provider.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(group_id): Path<String>,
    Json(body): Json<NewMeeting>,
) -> Result<(StatusCode, Json<ApiSuccess<Meeting>>), ApiError> {
    validate_required("title", &body.title).map_err(ApiError::Validation)?;
    let group_id = parse_id(&group_id, "group")?;

    let meeting = Meeting {
        id: Uuid::new_v4(),
        group_id,
        host_id: user.user_id,
        title: body.title,
        room_name: format!("silverline-{}", Uuid::new_v4().simple()),
        scheduled_at: body.scheduled_at,
        duration_minutes: body.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
        created_at: Utc::now().naive_utc(),
    };

    let conn = ctx.core.open_db()?;
    repository::insert_meeting(&conn, &meeting).map_err(ApiError::from)?;
    Ok(created("Meeting scheduled", meeting))
}

#[derive(Deserialize)]
pub struct MeetingListQuery {
    pub upcoming: Option<bool>,
}

/// `GET /api/groups/:id/meetings` — member-only, soonest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(group_id): Path<String>,
    Query(query): Query<MeetingListQuery>,
) -> Result<Json<ApiSuccess<Vec<Meeting>>>, ApiError> {
    let group_id = parse_id(&group_id, "group")?;
    let conn = ctx.core.open_db()?;
    let meetings = repository::list_meetings(
        &conn,
        &group_id,
        &user.user_id,
        query.upcoming.unwrap_or(false),
    )
    .map_err(ApiError::from)?;
    Ok(ok(meetings))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingJoinInfo {
    #[serde(flatten)]
    pub meeting: Meeting,
    pub join_url: String,
}

/// `GET /api/meetings/:id` — join info with the provider URL.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(meeting_id): Path<String>,
) -> Result<Json<ApiSuccess<MeetingJoinInfo>>, ApiError> {
    let meeting_id = parse_id(&meeting_id, "meeting")?;
    let conn = ctx.core.open_db()?;
    let meeting = repository::get_meeting(&conn, &meeting_id)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("meeting not found".into()))?;
    repository::ensure_member(&conn, &meeting.group_id, &user.user_id).map_err(ApiError::from)?;

    let join_url = format!("{}/{}", config::meeting_base_url(), meeting.room_name);
    Ok(ok(MeetingJoinInfo { meeting, join_url }))
}
