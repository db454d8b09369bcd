//! API router.
//!
//! Returns a composable `Router` mounted under `/api/`. Every route sits
//! behind the identity middleware; CORS is open for the browser frontend.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the full API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        // profile
        .route("/me", get(endpoints::profile::me))
        .route(
            "/me/emergency-contacts",
            get(endpoints::profile::list_emergency_contacts)
                .post(endpoints::profile::add_emergency_contact),
        )
        // groups
        .route(
            "/groups",
            post(endpoints::groups::create).get(endpoints::groups::list_mine),
        )
        .route("/groups/:id/join", post(endpoints::groups::join))
        // announcements
        .route(
            "/groups/:id/announcements",
            post(endpoints::announcements::create).get(endpoints::announcements::list),
        )
        .route(
            "/announcements/:id",
            put(endpoints::announcements::update).delete(endpoints::announcements::delete),
        )
        .route(
            "/announcements/:id/comments",
            post(endpoints::announcements::comment).get(endpoints::announcements::comments),
        )
        // chat
        .route(
            "/groups/:id/conversations",
            post(endpoints::chat::create_conversation).get(endpoints::chat::list_conversations),
        )
        .route(
            "/conversations/:id/messages",
            get(endpoints::chat::list_messages).post(endpoints::chat::send_message),
        )
        // events
        .route(
            "/groups/:id/events",
            post(endpoints::events::create).get(endpoints::events::list),
        )
        .route("/events/:id", get(endpoints::events::detail))
        .route(
            "/events/:id/join",
            post(endpoints::events::join).delete(endpoints::events::leave),
        )
        // exercises
        .route(
            "/exercises",
            post(endpoints::exercises::create).get(endpoints::exercises::list),
        )
        .route("/exercises/summary", get(endpoints::exercises::summary))
        // goals
        .route(
            "/goals",
            post(endpoints::goals::create).get(endpoints::goals::list),
        )
        .route(
            "/goals/:id",
            put(endpoints::goals::update).delete(endpoints::goals::delete),
        )
        .route("/goals/:id/progress", post(endpoints::goals::progress))
        // health
        .route(
            "/medications",
            post(endpoints::health::create_medication).get(endpoints::health::list_medications),
        )
        .route(
            "/medications/:id/deactivate",
            post(endpoints::health::deactivate_medication),
        )
        .route(
            "/medication-logs/:id/taken",
            post(endpoints::health::mark_dose_taken),
        )
        .route(
            "/health-metrics",
            post(endpoints::health::create_metric).get(endpoints::health::list_metrics),
        )
        .route(
            "/health-metrics/:id",
            put(endpoints::health::update_metric).delete(endpoints::health::delete_metric),
        )
        .route("/health-dashboard", get(endpoints::health::health_dashboard))
        .route("/health-report", get(endpoints::health::health_report))
        // meetings
        .route(
            "/groups/:id/meetings",
            post(endpoints::meetings::create).get(endpoints::meetings::list),
        )
        .route("/meetings/:id", get(endpoints::meetings::detail))
        // navigation
        .route(
            "/navigation/places",
            post(endpoints::navigation::create).get(endpoints::navigation::list),
        )
        .route(
            "/navigation/places/:id",
            delete(endpoints::navigation::delete),
        )
        // reviews
        .route("/facilities", get(endpoints::reviews::list_facilities))
        .route(
            "/facilities/:id/reviews",
            get(endpoints::reviews::facility_reviews),
        )
        .route("/reviews", post(endpoints::reviews::create))
        .route(
            "/reviews/:id",
            put(endpoints::reviews::update).delete(endpoints::reviews::delete),
        )
        .with_state(ctx.clone())
        // identity middleware needs ApiContext from the Extension layer
        .layer(axum::middleware::from_fn(
            middleware::identity::require_identity,
        ))
        .layer(axum::Extension(ctx));

    Router::new().nest("/api", routes).layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::db::repository::test_support::{
        make_facility, make_group, make_log, make_medication, make_user,
    };

    /// Router backed by a temp-file database. Returns (router, state, guard).
    fn test_app() -> (Router, Arc<CoreState>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let state = Arc::new(CoreState::with_db_path(tmp.path().join("test.db")));
        let app = api_router(state.clone());
        (app, state, tmp)
    }

    fn request(method: &str, uri: &str, user: Option<&Uuid>, body: Option<serde_json::Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("X-User-Id", user.to_string());
        }
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_identity_header_is_400() {
        let (app, _state, _tmp) = test_app();
        let response = app
            .oneshot(request("GET", "/api/groups", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn unknown_user_is_403() {
        let (app, _state, _tmp) = test_app();
        let ghost = Uuid::new_v4();
        let response = app
            .oneshot(request("GET", "/api/groups", Some(&ghost), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn post_health_metric_returns_201_with_contract_shape() {
        let (app, state, _tmp) = test_app();
        let ada = make_user(&state.open_db().unwrap(), "Ada");

        let response = app
            .oneshot(request(
                "POST",
                "/api/health-metrics",
                Some(&ada),
                Some(serde_json::json!({"metricType": "weight", "value": 82.5})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = body_json(response).await;
        assert_eq!(json["status"], "success");
        assert!(json["message"].is_string());
        assert!(json["data"]["metricId"].is_string());
        assert_eq!(json["data"]["metricType"], "weight");
        assert_eq!(json["data"]["value"], 82.5);
        assert_eq!(json["data"]["unit"], "kg");
        assert!(json["data"]["recordedAt"].is_string());
    }

    #[tokio::test]
    async fn post_health_metric_without_value_is_400() {
        let (app, state, _tmp) = test_app();
        let ada = make_user(&state.open_db().unwrap(), "Ada");

        let response = app
            .oneshot(request(
                "POST",
                "/api/health-metrics",
                Some(&ada),
                Some(serde_json::json!({"metricType": "weight"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "VALIDATION");
        assert!(json["message"].as_str().unwrap().contains("value"));
    }

    #[tokio::test]
    async fn inverted_blood_pressure_is_rejected() {
        let (app, state, _tmp) = test_app();
        let ada = make_user(&state.open_db().unwrap(), "Ada");

        let response = app
            .oneshot(request(
                "POST",
                "/api/health-metrics",
                Some(&ada),
                Some(serde_json::json!({
                    "metricType": "blood_pressure",
                    "value": 120.0,
                    "valueSecondary": 130.0
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["message"]
            .as_str()
            .unwrap()
            .contains("systolic must be greater than diastolic"));
    }

    #[tokio::test]
    async fn dashboard_has_documented_shape() {
        let (app, state, _tmp) = test_app();
        let conn = state.open_db().unwrap();
        let ada = make_user(&conn, "Ada");
        let med_id = make_medication(&conn, &ada, "Ramipril");
        make_log(&conn, &med_id, 1, 8, true);
        make_log(&conn, &med_id, 2, 8, false);
        drop(conn);

        let response = app
            .oneshot(request("GET", "/api/health-dashboard", Some(&ada), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "success");
        let data = &json["data"];
        assert_eq!(data["overallStats"]["totalDoses"], 2);
        assert_eq!(data["overallStats"]["takenDoses"], 1);
        assert_eq!(data["overallStats"]["overallCompliance"], 50);
        assert_eq!(data["dailyAdherence"].as_array().unwrap().len(), 7);
        assert_eq!(data["medicationAdherence"][0]["name"], "Ramipril");
        assert_eq!(data["recentMissed"].as_array().unwrap().len(), 1);
        assert!(data["weeklyTrends"].is_array());
    }

    #[tokio::test]
    async fn duplicate_review_surfaces_409() {
        let (app, state, _tmp) = test_app();
        let conn = state.open_db().unwrap();
        let ada = make_user(&conn, "Ada");
        let facility_id = make_facility(&conn, "Oak Manor");
        drop(conn);

        let body = serde_json::json!({"facilityId": facility_id.to_string(), "rating": 5});
        let first = app
            .clone()
            .oneshot(request("POST", "/api/reviews", Some(&ada), Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app
            .oneshot(request("POST", "/api/reviews", Some(&ada), Some(body)))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let json = body_json(second).await;
        assert_eq!(json["error"], "CONFLICT");
    }

    #[tokio::test]
    async fn non_member_comment_is_403_and_writes_nothing() {
        let (app, state, _tmp) = test_app();
        let conn = state.open_db().unwrap();
        let ada = make_user(&conn, "Ada");
        let zed = make_user(&conn, "Zed");
        let group_id = make_group(&conn, &ada, "Gardeners");
        drop(conn);

        let create = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/groups/{group_id}/announcements"),
                Some(&ada),
                Some(serde_json::json!({"title": "Hello", "body": "First post"})),
            ))
            .await
            .unwrap();
        assert_eq!(create.status(), StatusCode::CREATED);
        let announcement_id = body_json(create).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let comment = app
            .oneshot(request(
                "POST",
                &format!("/api/announcements/{announcement_id}/comments"),
                Some(&zed),
                Some(serde_json::json!({"body": "let me in"})),
            ))
            .await
            .unwrap();
        assert_eq!(comment.status(), StatusCode::FORBIDDEN);
        let json = body_json(comment).await;
        assert_eq!(json["error"], "NOT_MEMBER");

        let conn = state.open_db().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM announcement_comments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn goal_progress_flow_completes_goal() {
        let (app, state, _tmp) = test_app();
        let ada = make_user(&state.open_db().unwrap(), "Ada");

        let create = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/goals",
                Some(&ada),
                Some(serde_json::json!({
                    "title": "Walk 10km",
                    "category": "activity",
                    "targetValue": 10.0,
                    "unit": "km"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(create.status(), StatusCode::CREATED);
        let goal_id = body_json(create).await["data"]["id"].as_str().unwrap().to_string();

        let progress = app
            .oneshot(request(
                "POST",
                &format!("/api/goals/{goal_id}/progress"),
                Some(&ada),
                Some(serde_json::json!({"amount": 12.0})),
            ))
            .await
            .unwrap();
        assert_eq!(progress.status(), StatusCode::OK);
        let json = body_json(progress).await;
        assert_eq!(json["data"]["status"], "completed");
    }

    #[tokio::test]
    async fn mark_dose_taken_twice_is_409() {
        let (app, state, _tmp) = test_app();
        let conn = state.open_db().unwrap();
        let ada = make_user(&conn, "Ada");
        let med_id = make_medication(&conn, &ada, "Ramipril");
        let log_id = make_log(&conn, &med_id, 0, 8, false);
        drop(conn);

        let uri = format!("/api/medication-logs/{log_id}/taken");
        let first = app
            .clone()
            .oneshot(request("POST", &uri, Some(&ada), None))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .oneshot(request("POST", &uri, Some(&ada), None))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn member_only_event_join_rejects_outsider() {
        let (app, state, _tmp) = test_app();
        let conn = state.open_db().unwrap();
        let ada = make_user(&conn, "Ada");
        let zed = make_user(&conn, "Zed");
        let group_id = make_group(&conn, &ada, "Wellness");
        drop(conn);

        let create = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/groups/{group_id}/events"),
                Some(&ada),
                Some(serde_json::json!({
                    "title": "Chair yoga",
                    "startsAt": "2099-05-01T10:00:00"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(create.status(), StatusCode::CREATED);
        let event_id = body_json(create).await["data"]["id"].as_str().unwrap().to_string();

        let join = app
            .oneshot(request(
                "POST",
                &format!("/api/events/{event_id}/join"),
                Some(&zed),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(join.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn health_report_includes_alerts_and_streak() {
        let (app, state, _tmp) = test_app();
        let conn = state.open_db().unwrap();
        let ada = make_user(&conn, "Ada");
        let med_id = make_medication(&conn, &ada, "Ramipril");
        // 10 doses, 6 taken → 60% → critical bracket
        for dose in 0u32..10 {
            make_log(&conn, &med_id, i64::from(dose % 5), 8 + (dose / 5) * 12, dose < 6);
        }
        drop(conn);

        let response = app
            .oneshot(request("GET", "/api/health-report", Some(&ada), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let data = &json["data"];
        assert_eq!(data["compliance"]["complianceRate"], 60);
        assert_eq!(data["compliance"]["complianceLevel"], "medium");
        assert_eq!(data["alerts"][0]["type"], "compliance");
        assert_eq!(data["alerts"][0]["severity"], "critical");
        assert!(data["longestStreak"].is_number());
    }

    #[tokio::test]
    async fn bad_uuid_in_path_is_400() {
        let (app, state, _tmp) = test_app();
        let ada = make_user(&state.open_db().unwrap(), "Ada");

        let response = app
            .oneshot(request("GET", "/api/events/not-a-uuid", Some(&ada), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let (app, _state, _tmp) = test_app();
        let response = app
            .oneshot(request("GET", "/api/nope", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
