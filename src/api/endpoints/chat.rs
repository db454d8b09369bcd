//! Chat endpoints: group conversations and their messages.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{created, ok, ApiContext, ApiSuccess, UserContext};
use crate::db::repository;
use crate::models::{Conversation, Message};
use crate::validation::validate_required;

const DEFAULT_MESSAGE_LIMIT: u32 = 100;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    pub title: String,
}

/// `POST /api/groups/:id/conversations` — member-only.
pub async fn create_conversation(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(group_id): Path<String>,
    Json(body): Json<NewConversation>,
) -> Result<(StatusCode, Json<ApiSuccess<Conversation>>), ApiError> {
    validate_required("title", &body.title).map_err(ApiError::Validation)?;
    let group_id = parse_id(&group_id, "group")?;

    let conversation = Conversation {
        id: Uuid::new_v4(),
        group_id,
        title: body.title,
        created_at: Utc::now().naive_utc(),
    };

    let conn = ctx.core.open_db()?;
    repository::insert_conversation(&conn, &conversation, &user.user_id)
        .map_err(ApiError::from)?;
    Ok(created("Conversation started", conversation))
}

/// `GET /api/groups/:id/conversations` — member-only.
pub async fn list_conversations(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(group_id): Path<String>,
) -> Result<Json<ApiSuccess<Vec<Conversation>>>, ApiError> {
    let group_id = parse_id(&group_id, "group")?;
    let conn = ctx.core.open_db()?;
    let conversations = repository::list_conversations(&conn, &group_id, &user.user_id)
        .map_err(ApiError::from)?;
    Ok(ok(conversations))
}

#[derive(Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<u32>,
}

/// `GET /api/conversations/:id/messages` — member-only, oldest first.
pub async fn list_messages(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(conversation_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<ApiSuccess<Vec<Message>>>, ApiError> {
    let conversation_id = parse_id(&conversation_id, "conversation")?;
    let conn = ctx.core.open_db()?;
    let messages = repository::list_messages(
        &conn,
        &conversation_id,
        &user.user_id,
        query.limit.unwrap_or(DEFAULT_MESSAGE_LIMIT),
    )
    .map_err(ApiError::from)?;
    Ok(ok(messages))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub body: String,
}

/// `POST /api/conversations/:id/messages` — member-only.
pub async fn send_message(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(conversation_id): Path<String>,
    Json(body): Json<NewMessage>,
) -> Result<(StatusCode, Json<ApiSuccess<Message>>), ApiError> {
    validate_required("body", &body.body).map_err(ApiError::Validation)?;
    let conversation_id = parse_id(&conversation_id, "conversation")?;

    let message = Message {
        id: Uuid::new_v4(),
        conversation_id,
        sender_id: user.user_id,
        body: body.body,
        sent_at: Utc::now().naive_utc(),
    };

    let conn = ctx.core.open_db()?;
    repository::insert_message(&conn, &message).map_err(ApiError::from)?;
    Ok(created("Message sent", message))
}
