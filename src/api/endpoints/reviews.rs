//! Facility review endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{created, ok, ApiContext, ApiSuccess, UserContext};
use crate::db::repository::{self, FacilityReviews};
use crate::models::{Facility, Review};
use crate::validation::validate_rating;

/// `GET /api/facilities`
pub async fn list_facilities(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
) -> Result<Json<ApiSuccess<Vec<Facility>>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let facilities = repository::list_facilities(&conn).map_err(ApiError::from)?;
    Ok(ok(facilities))
}

/// `GET /api/facilities/:id/reviews` — reviews plus average rating.
pub async fn facility_reviews(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<UserContext>,
    Path(facility_id): Path<String>,
) -> Result<Json<ApiSuccess<FacilityReviews>>, ApiError> {
    let facility_id = parse_id(&facility_id, "facility")?;
    let conn = ctx.core.open_db()?;
    let page = repository::facility_reviews(&conn, &facility_id).map_err(ApiError::from)?;
    Ok(ok(page))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub facility_id: String,
    pub rating: u8,
    pub comment: Option<String>,
}

/// `POST /api/reviews` — one per (user, facility); duplicates are 409.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewReview>,
) -> Result<(StatusCode, Json<ApiSuccess<Review>>), ApiError> {
    validate_rating(body.rating).map_err(ApiError::Validation)?;
    let facility_id = parse_id(&body.facility_id, "facility")?;

    let review = Review {
        id: Uuid::new_v4(),
        facility_id,
        user_id: user.user_id,
        rating: body.rating,
        comment: body.comment,
        created_at: Utc::now().naive_utc(),
        updated_at: None,
    };

    let conn = ctx.core.open_db()?;
    repository::insert_review(&conn, &review).map_err(ApiError::from)?;
    Ok(created("Review submitted", review))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEdit {
    pub rating: u8,
    pub comment: Option<String>,
}

/// `PUT /api/reviews/:id` — author-only.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(body): Json<ReviewEdit>,
) -> Result<Json<ApiSuccess<Review>>, ApiError> {
    validate_rating(body.rating).map_err(ApiError::Validation)?;
    let id = parse_id(&id, "review")?;

    let conn = ctx.core.open_db()?;
    let review = repository::update_review(
        &conn,
        &id,
        &user.user_id,
        body.rating,
        body.comment.as_deref(),
    )
    .map_err(ApiError::from)?;
    Ok(ok(review))
}

/// `DELETE /api/reviews/:id` — author-only.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<()>>, ApiError> {
    let id = parse_id(&id, "review")?;
    let conn = ctx.core.open_db()?;
    repository::delete_review(&conn, &id, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(()))
}
