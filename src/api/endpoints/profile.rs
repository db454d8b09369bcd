//! Profile endpoints: the caller's account and emergency contacts.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{created, ok, ApiContext, ApiSuccess, UserContext};
use crate::db::repository;
use crate::models::{EmergencyContact, User};
use crate::validation::validate_required;

/// `GET /api/me` — the caller's own record.
pub async fn me(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<ApiSuccess<User>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let record = repository::get_user(&conn, &user.user_id)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(ok(record))
}

/// `GET /api/me/emergency-contacts`
pub async fn list_emergency_contacts(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<ApiSuccess<Vec<EmergencyContact>>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let contacts =
        repository::get_emergency_contacts(&conn, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(contacts))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmergencyContact {
    pub name: String,
    pub phone: String,
    pub relation: Option<String>,
}

/// `POST /api/me/emergency-contacts`
pub async fn add_emergency_contact(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewEmergencyContact>,
) -> Result<(StatusCode, Json<ApiSuccess<EmergencyContact>>), ApiError> {
    validate_required("name", &body.name).map_err(ApiError::Validation)?;
    validate_required("phone", &body.phone).map_err(ApiError::Validation)?;

    let contact = EmergencyContact {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        name: body.name,
        phone: body.phone,
        relation: body.relation,
    };

    let conn = ctx.core.open_db()?;
    repository::insert_emergency_contact(&conn, &contact).map_err(ApiError::from)?;
    Ok(created("Emergency contact added", contact))
}
