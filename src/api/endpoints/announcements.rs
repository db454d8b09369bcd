//! Announcement endpoints.
//!
//! Group-scoped posting and reading; comments are member-only and edits
//! are author-only.

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
use crate::models::{Announcement, AnnouncementComment};
use crate::validation::validate_required;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    pub title: String,
    pub body: String,
}

/// `POST /api/groups/:id/announcements` — member-only.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(group_id): Path<String>,
    Json(body): Json<NewAnnouncement>,
) -> Result<(StatusCode, Json<ApiSuccess<Announcement>>), ApiError> {
    validate_required("title", &body.title).map_err(ApiError::Validation)?;
    validate_required("body", &body.body).map_err(ApiError::Validation)?;
    let group_id = parse_id(&group_id, "group")?;

    let announcement = Announcement {
        id: Uuid::new_v4(),
        group_id,
        author_id: user.user_id,
        title: body.title,
        body: body.body,
        created_at: Utc::now().naive_utc(),
        updated_at: None,
    };

    let conn = ctx.core.open_db()?;
    repository::insert_announcement(&conn, &announcement).map_err(ApiError::from)?;
    Ok(created("Announcement posted", announcement))
}

/// `GET /api/groups/:id/announcements` — member-only, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(group_id): Path<String>,
) -> Result<Json<ApiSuccess<Vec<Announcement>>>, ApiError> {
    let group_id = parse_id(&group_id, "group")?;
    let conn = ctx.core.open_db()?;
    let announcements =
        repository::list_announcements(&conn, &group_id, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(announcements))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementEdit {
    pub title: String,
    pub body: String,
}

/// `PUT /api/announcements/:id` — author-only.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(body): Json<AnnouncementEdit>,
) -> Result<Json<ApiSuccess<Announcement>>, ApiError> {
    validate_required("title", &body.title).map_err(ApiError::Validation)?;
    validate_required("body", &body.body).map_err(ApiError::Validation)?;
    let id = parse_id(&id, "announcement")?;

    let conn = ctx.core.open_db()?;
    let updated =
        repository::update_announcement(&conn, &id, &user.user_id, &body.title, &body.body)
            .map_err(ApiError::from)?;
    Ok(ok(updated))
}

/// `DELETE /api/announcements/:id` — author-only.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<()>>, ApiError> {
    let id = parse_id(&id, "announcement")?;
    let conn = ctx.core.open_db()?;
    repository::delete_announcement(&conn, &id, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub body: String,
}

/// `POST /api/announcements/:id/comments` — member-only; a non-member is
/// turned away before anything is written.
pub async fn comment(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(body): Json<NewComment>,
) -> Result<(StatusCode, Json<ApiSuccess<AnnouncementComment>>), ApiError> {
    validate_required("body", &body.body).map_err(ApiError::Validation)?;
    let id = parse_id(&id, "announcement")?;

    let comment = AnnouncementComment {
        id: Uuid::new_v4(),
        announcement_id: id,
        author_id: user.user_id,
        body: body.body,
        created_at: Utc::now().naive_utc(),
    };

    let conn = ctx.core.open_db()?;
    repository::insert_comment(&conn, &comment).map_err(ApiError::from)?;
    Ok(created("Comment posted", comment))
}

/// `GET /api/announcements/:id/comments` — member-only, oldest first.
pub async fn comments(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<Vec<AnnouncementComment>>>, ApiError> {
    let id = parse_id(&id, "announcement")?;
    let conn = ctx.core.open_db()?;
    let comments = repository::list_comments(&conn, &id, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(comments))
}
