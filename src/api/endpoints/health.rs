//! Health endpoints: medications, dose logs, metrics, the adherence
//! dashboard, and the health report.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_id;
use crate::analytics::AlertSeverity;
use crate::api::error::ApiError;
use crate::api::types::{created, ok, ApiContext, ApiSuccess, UserContext};
use crate::dashboard::{self, HealthDashboard, HealthReport, MedicationAdherence};
use crate::db::repository;
use crate::models::enums::MetricType;
use crate::models::{HealthMetric, Medication, MedicationLog};
use crate::validation::{validate_health_metric, validate_required};

/// Default analysis window for dashboard, report, and medication lists.
const DEFAULT_WINDOW_DAYS: u32 = 7;

#[derive(Deserialize)]
pub struct WindowQuery {
    pub days: Option<u32>,
}

// ---------------------------------------------------------------------------
// Medications
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
}

/// `POST /api/medications`
pub async fn create_medication(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewMedication>,
) -> Result<(StatusCode, Json<ApiSuccess<Medication>>), ApiError> {
    validate_required("name", &body.name).map_err(ApiError::Validation)?;
    validate_required("dosage", &body.dosage).map_err(ApiError::Validation)?;
    validate_required("frequency", &body.frequency).map_err(ApiError::Validation)?;

    let medication = Medication {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        name: body.name,
        dosage: body.dosage,
        frequency: body.frequency,
        instructions: body.instructions,
        active: true,
        created_at: Utc::now().naive_utc(),
    };

    let conn = ctx.core.open_db()?;
    repository::insert_medication(&conn, &medication).map_err(ApiError::from)?;
    Ok(created("Medication added", medication))
}

/// `GET /api/medications?days=` — active medications with per-medication
/// adherence over the window.
pub async fn list_medications(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiSuccess<Vec<MedicationAdherence>>>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let since = Utc::now().naive_utc() - chrono::Duration::days(i64::from(days));

    let conn = ctx.core.open_db()?;
    let adherence =
        dashboard::medication_adherence(&conn, &user.user_id, since).map_err(ApiError::from)?;
    Ok(ok(adherence))
}

/// `POST /api/medications/:id/deactivate` — owner-only, soft.
pub async fn deactivate_medication(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<Medication>>, ApiError> {
    let id = parse_id(&id, "medication")?;
    let conn = ctx.core.open_db()?;
    let medication =
        repository::deactivate_medication(&conn, &id, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(medication))
}

/// `POST /api/medication-logs/:id/taken` — mark a dose taken, once.
pub async fn mark_dose_taken(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<MedicationLog>>, ApiError> {
    let id = parse_id(&id, "medication log")?;
    let conn = ctx.core.open_db()?;
    let log = repository::mark_dose_taken(&conn, &id, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(log))
}

// ---------------------------------------------------------------------------
// Health metrics
// ---------------------------------------------------------------------------

/// Fields are optional so that missing metricType/value produce a 400
/// with a proper message, not an extractor rejection.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHealthMetric {
    pub metric_type: Option<String>,
    pub value: Option<f64>,
    pub value_secondary: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: Option<NaiveDateTime>,
}

/// The documented creation response payload.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetricCreated {
    pub metric_id: Uuid,
    pub metric_type: MetricType,
    pub value: f64,
    pub unit: String,
    pub recorded_at: NaiveDateTime,
}

/// `POST /api/health-metrics`
pub async fn create_metric(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewHealthMetric>,
) -> Result<(StatusCode, Json<ApiSuccess<HealthMetricCreated>>), ApiError> {
    let metric_type_raw = body
        .metric_type
        .ok_or_else(|| ApiError::Validation(vec!["metricType is required".into()]))?;
    let value = body
        .value
        .ok_or_else(|| ApiError::Validation(vec!["value is required".into()]))?;
    let metric_type = MetricType::from_str(&metric_type_raw)
        .map_err(|_| ApiError::Validation(vec![format!("unknown metricType {metric_type_raw}")]))?;

    validate_health_metric(metric_type, value, body.value_secondary, body.recorded_at)
        .map_err(ApiError::Validation)?;

    let now = Utc::now().naive_utc();
    let metric = HealthMetric {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        metric_type,
        value,
        value_secondary: body.value_secondary,
        unit: body
            .unit
            .unwrap_or_else(|| metric_type.default_unit().to_string()),
        notes: body.notes,
        recorded_at: body.recorded_at.unwrap_or(now),
        created_at: now,
    };

    let conn = ctx.core.open_db()?;
    repository::insert_health_metric(&conn, &metric).map_err(ApiError::from)?;

    Ok(created(
        "Health metric recorded",
        HealthMetricCreated {
            metric_id: metric.id,
            metric_type: metric.metric_type,
            value: metric.value,
            unit: metric.unit,
            recorded_at: metric.recorded_at,
        },
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricListQuery {
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
    pub days: Option<u32>,
}

/// `GET /api/health-metrics?type=&days=`
pub async fn list_metrics(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<MetricListQuery>,
) -> Result<Json<ApiSuccess<Vec<HealthMetric>>>, ApiError> {
    let metric_type = query
        .metric_type
        .map(|t| {
            MetricType::from_str(&t)
                .map_err(|_| ApiError::BadRequest(format!("unknown metric type {t}")))
        })
        .transpose()?;

    let conn = ctx.core.open_db()?;
    let metrics = repository::list_health_metrics(
        &conn,
        &user.user_id,
        metric_type,
        query.days.unwrap_or(30),
    )
    .map_err(ApiError::from)?;
    Ok(ok(metrics))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricEdit {
    pub value: f64,
    pub value_secondary: Option<f64>,
    pub notes: Option<String>,
}

/// `PUT /api/health-metrics/:id` — owner-only; re-validated against the
/// stored metric type.
pub async fn update_metric(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
    Json(body): Json<MetricEdit>,
) -> Result<Json<ApiSuccess<HealthMetric>>, ApiError> {
    let id = parse_id(&id, "health metric")?;

    let conn = ctx.core.open_db()?;
    let existing = repository::get_health_metric(&conn, &id)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("health metric not found".into()))?;

    validate_health_metric(existing.metric_type, body.value, body.value_secondary, None)
        .map_err(ApiError::Validation)?;

    let metric = repository::update_health_metric(
        &conn,
        &id,
        &user.user_id,
        body.value,
        body.value_secondary,
        body.notes.as_deref(),
    )
    .map_err(ApiError::from)?;
    Ok(ok(metric))
}

/// `DELETE /api/health-metrics/:id` — owner-only.
pub async fn delete_metric(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<ApiSuccess<()>>, ApiError> {
    let id = parse_id(&id, "health metric")?;
    let conn = ctx.core.open_db()?;
    repository::delete_health_metric(&conn, &id, &user.user_id).map_err(ApiError::from)?;
    Ok(ok(()))
}

// ---------------------------------------------------------------------------
// Dashboard & report
// ---------------------------------------------------------------------------

/// `GET /api/health-dashboard?days=`
pub async fn health_dashboard(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiSuccess<HealthDashboard>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let data = dashboard::build_dashboard(
        &conn,
        &user.user_id,
        query.days.unwrap_or(DEFAULT_WINDOW_DAYS),
    )
    .map_err(ApiError::from)?;
    Ok(ok(data))
}

/// `GET /api/health-report?days=` — compliance, streak, trends, alerts.
/// Critical alerts are handed to the dispatcher for emergency-contact
/// notification; dispatch failure is logged, never retried.
pub async fn health_report(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiSuccess<HealthReport>>, ApiError> {
    let report = {
        let conn = ctx.core.open_db()?;
        let report = dashboard::build_health_report(
            &conn,
            &user.user_id,
            query.days.unwrap_or(DEFAULT_WINDOW_DAYS),
        )
        .map_err(ApiError::from)?;

        let criticals: Vec<_> = report
            .alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .collect();
        if !criticals.is_empty() {
            let contacts = repository::get_emergency_contacts(&conn, &user.user_id)
                .map_err(ApiError::from)?;
            for alert in criticals {
                if let Err(e) = ctx.core.dispatcher.dispatch(user.user_id, &contacts, alert) {
                    tracing::warn!("Alert dispatch failed: {e}");
                }
            }
        }
        report
    }; // connection released before serialization

    Ok(ok(report))
}
