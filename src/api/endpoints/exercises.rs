//! Exercise endpoints: record sessions, browse history, summary card.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{created, ok, ApiContext, ApiSuccess, UserContext};
use crate::db::repository::{self, ExerciseSummary};
use crate::models::enums::{ExerciseActivity, ExerciseIntensity};
use crate::models::Exercise;
use crate::validation::validate_exercise_duration;

const DEFAULT_WINDOW_DAYS: u32 = 7;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    pub activity: ExerciseActivity,
    pub duration_minutes: u32,
    pub intensity: Option<ExerciseIntensity>,
    pub notes: Option<String>,
    pub performed_at: Option<NaiveDateTime>,
}

/// `POST /api/exercises` — record a session (defaults to "just now").
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewExercise>,
) -> Result<(StatusCode, Json<ApiSuccess<Exercise>>), ApiError> {
    validate_exercise_duration(body.duration_minutes).map_err(ApiError::Validation)?;

    let exercise = Exercise {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        activity: body.activity,
        duration_minutes: body.duration_minutes,
        intensity: body.intensity,
        notes: body.notes,
        performed_at: body.performed_at.unwrap_or_else(|| Utc::now().naive_utc()),
    };

    let conn = ctx.core.open_db()?;
    repository::insert_exercise(&conn, &exercise).map_err(ApiError::from)?;
    Ok(created("Exercise recorded", exercise))
}

#[derive(Deserialize)]
pub struct ExerciseQuery {
    pub days: Option<u32>,
}

/// `GET /api/exercises?days=`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<ExerciseQuery>,
) -> Result<Json<ApiSuccess<Vec<Exercise>>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let exercises = repository::list_exercises(
        &conn,
        &user.user_id,
        query.days.unwrap_or(DEFAULT_WINDOW_DAYS),
    )
    .map_err(ApiError::from)?;
    Ok(ok(exercises))
}

/// `GET /api/exercises/summary?days=`
pub async fn summary(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<ExerciseQuery>,
) -> Result<Json<ApiSuccess<ExerciseSummary>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let summary = repository::exercise_summary(
        &conn,
        &user.user_id,
        query.days.unwrap_or(DEFAULT_WINDOW_DAYS),
    )
    .map_err(ApiError::from)?;
    Ok(ok(summary))
}
