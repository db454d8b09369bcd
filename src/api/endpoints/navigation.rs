//! Navigation endpoints: saved places.
//!
//! Directions come from the external maps API on the client side; the
//! service stores only the destinations people save.

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
use crate::models::Place;
use crate::validation::{validate_coordinates, validate_required};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlace {
    pub label: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// `POST /api/navigation/places`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewPlace>,
) -> Result<(StatusCode, Json<ApiSuccess<Place>>), ApiError> {
    validate_required("label", &body.label).map_err(ApiError::Validation)?;
    validate_required("address", &body.address).map_err(ApiError::Validation)?;
    validate_coordinates(body.latitude, body.longitude).map_err(ApiError::Validation)?;

    let place = Place {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        label: body.label,
        address: body.address,
        latitude: body.latitude,
        longitude: body.longitude,
        created_at: Utc::now().naive_utc(),
    };

    let conn = ctx.core.open_db()?;
    repository::insert_place(&conn, &place).map_err(ApiError::from)?;
    Ok(created("Place saved", place))
}

/// `GET /api/navigation/places`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<ApiSuccess<Vec<Place>>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let places = repository::list_places(&conn, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(places))
}

/// `DELETE /api/navigation/places/:id` — owner-only.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<()>>, ApiError> {
    let id = parse_id(&id, "place")?;
    let conn = ctx.core.open_db()?;
    repository::delete_place(&conn, &id, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(()))
}
