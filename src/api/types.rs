//! Shared types for the API layer.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::core_state::CoreState;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Caller identity, injected into request extensions by the identity
/// middleware after the user is resolved.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: Uuid,
    pub display_name: String,
}

/// Success envelope, identical on every endpoint:
/// `{"status":"success","message"?,"data":...}`.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

/// 200 with data.
pub fn ok<T: Serialize>(data: T) -> Json<ApiSuccess<T>> {
    Json(ApiSuccess {
        status: "success",
        message: None,
        data,
    })
}

/// 201 with a message, for freshly created resources.
pub fn created<T: Serialize>(message: &str, data: T) -> (StatusCode, Json<ApiSuccess<T>>) {
    (
        StatusCode::CREATED,
        Json(ApiSuccess {
            status: "success",
            message: Some(message.to_string()),
            data,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_omits_message() {
        let Json(body) = ok(serde_json::json!({"x": 1}));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("message").is_none());
        assert_eq!(json["data"]["x"], 1);
    }

    #[test]
    fn created_envelope_has_message_and_201() {
        let (status, Json(body)) = created("Saved", serde_json::json!({}));
        assert_eq!(status, StatusCode::CREATED);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["message"], "Saved");
    }
}
