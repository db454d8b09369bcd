//! Group event endpoints: schedule, browse, join, leave.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{created, ok, ApiContext, ApiSuccess, UserContext};
use crate::db::repository;
use crate::models::GroupEvent;
use crate::validation::validate_required;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: NaiveDateTime,
    pub ends_at: Option<NaiveDateTime>,
    pub capacity: Option<u32>,
}

/// `POST /api/groups/:id/events` — member-only.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(group_id): Path<String>,
    Json(body): Json<NewEvent>,
) -> Result<(StatusCode, Json<ApiSuccess<GroupEvent>>), ApiError> {
    validate_required("title", &body.title).map_err(ApiError::Validation)?;
    if let Some(ends) = body.ends_at {
        if ends <= body.starts_at {
            return Err(ApiError::Validation(vec![
                "endsAt must be after startsAt".into(),
            ]));
        }
    }
    let group_id = parse_id(&group_id, "group")?;

    let event = GroupEvent {
        id: Uuid::new_v4(),
        group_id,
        organizer_id: user.user_id,
        title: body.title,
        description: body.description,
        location: body.location,
        starts_at: body.starts_at,
        ends_at: body.ends_at,
        capacity: body.capacity,
        created_at: Utc::now().naive_utc(),
    };

    let conn = ctx.core.open_db()?;
    repository::insert_event(&conn, &event).map_err(ApiError::from)?;
    Ok(created("Event created", event))
}

#[derive(Deserialize)]
pub struct EventListQuery {
    pub upcoming: Option<bool>,
}

/// `GET /api/groups/:id/events` — member-only, soonest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(group_id): Path<String>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<ApiSuccess<Vec<GroupEvent>>>, ApiError> {
    let group_id = parse_id(&group_id, "group")?;
    let conn = ctx.core.open_db()?;
    let events = repository::list_events(
        &conn,
        &group_id,
        &user.user_id,
        query.upcoming.unwrap_or(false),
    )
    .map_err(ApiError::from)?;
    Ok(ok(events))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: GroupEvent,
    pub participant_count: u32,
}

/// `GET /api/events/:id` — detail with participant count.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(event_id): Path<String>,
) -> Result<Json<ApiSuccess<EventDetail>>, ApiError> {
    let event_id = parse_id(&event_id, "event")?;
    let conn = ctx.core.open_db()?;
    let event = repository::get_event(&conn, &event_id)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("event not found".into()))?;
    repository::ensure_member(&conn, &event.group_id, &user.user_id).map_err(ApiError::from)?;
    let participant_count =
        repository::participant_count(&conn, &event_id).map_err(ApiError::from)?;
    Ok(ok(EventDetail {
        event,
        participant_count,
    }))
}

/// `POST /api/events/:id/join` — member-only; full or repeated joins
/// conflict.
pub async fn join(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(event_id): Path<String>,
) -> Result<Json<ApiSuccess<()>>, ApiError> {
    let event_id = parse_id(&event_id, "event")?;
    let conn = ctx.core.open_db()?;
    repository::join_event(&conn, &event_id, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(()))
}

/// `DELETE /api/events/:id/join`
pub async fn leave(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(event_id): Path<String>,
) -> Result<Json<ApiSuccess<()>>, ApiError> {
    let event_id = parse_id(&event_id, "event")?;
    let conn = ctx.core.open_db()?;
    repository::leave_event(&conn, &event_id, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(()))
}
